use crate::cli::context::ClientContext;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::queue::lock_queue;
use crate::ui::messages::{info, warning};
use crate::utils::colors::colorize_in_out;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { worker, offline } = cmd {
        let worker = cfg.resolve_worker(worker)?;
        let ctx = ClientContext::open(cfg, *offline)?;
        let mut client = ctx.punch_client(cfg, None)?;

        if ctx.monitor.is_connected() {
            if let Err(e) = client.reconcile(&worker) {
                if !e.is_transient() {
                    return Err(e);
                }
                warning(format!("Could not reach the server ({}); showing the local view.", e));
            }
        } else {
            info("Offline: showing the local view.");
        }

        let label = client.display().label(client.now_local());
        println!(
            "👷 {}: {}",
            worker,
            colorize_in_out(&label, client.display().on_the_clock)
        );

        let pending = lock_queue(&ctx.queue)?
            .drain()
            .into_iter()
            .filter(|i| i.worker_id == worker)
            .count();
        if pending > 0 {
            println!("📥 {} punch(es) waiting to sync.", pending);
        }
    }

    Ok(())
}
