use crate::cli::context::ClientContext;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::queue::lock_queue;
use crate::ui::messages::{info, warning};
use std::thread;
use std::time::Duration;

/// Handle `sync` (manual resync) and `watch` (edge-triggered resync loop).
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Sync => sync_now(cfg),
        Commands::Watch { interval } => watch(cfg, interval.unwrap_or(cfg.watch_interval_secs)),
        _ => Ok(()),
    }
}

fn sync_now(cfg: &Config) -> AppResult<()> {
    let ctx = ClientContext::open(cfg, false)?;

    if !ctx.monitor.is_connected() {
        let pending = lock_queue(&ctx.queue)?.len();
        warning(format!(
            "Server unreachable at {}; {} punch(es) stay queued.",
            cfg.server_url, pending
        ));
        return Ok(());
    }

    match ctx.engine.sync()? {
        Some(report) if report.is_empty() => info("Nothing to sync."),
        Some(_) => {}
        None => info("A sync is already running."),
    }
    Ok(())
}

fn watch(cfg: &Config, interval_secs: u64) -> AppResult<()> {
    let ctx = ClientContext::open(cfg, false)?;
    let interval = Duration::from_secs(interval_secs.max(1));
    let events = ctx.monitor.subscribe()?;

    info(format!(
        "Watching {} every {}s (Ctrl-C to stop)…",
        cfg.server_url,
        interval.as_secs()
    ));

    // already online at start: nothing will flip, so drain once now
    if ctx.monitor.is_connected() {
        ctx.engine.sync()?;
    }

    let engine = &ctx.engine;
    thread::scope(|s| -> AppResult<()> {
        s.spawn(move || engine.run(events));
        loop {
            ctx.monitor.report(ctx.reachability.is_reachable());
            thread::sleep(interval);
        }
    })
}
