use crate::cli::context::ClientContext;
use crate::cli::parser::{Commands, PunchArgs};
use crate::config::Config;
use crate::core::client::PunchOutcome;
use crate::errors::{AppError, AppResult};
use crate::models::location::GeoPoint;
use crate::models::punch_kind::PunchKind;
use crate::store::queue::lock_queue;
use crate::utils::time::format_minutes;

/// Handle `in` / `out`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let (kind, args) = match cmd {
        Commands::In { args } => (PunchKind::TimeIn, args),
        Commands::Out { args } => (PunchKind::TimeOut, args),
        _ => return Ok(()),
    };
    submit(kind, args, cfg)
}

fn submit(kind: PunchKind, args: &PunchArgs, cfg: &Config) -> AppResult<()> {
    let worker = cfg.resolve_worker(&args.worker)?;

    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon).ok_or_else(|| {
            AppError::Permission(format!("invalid coordinates {}, {}", lat, lon))
        })?),
        _ => None,
    };

    let ctx = ClientContext::open(cfg, args.offline)?;

    // older queued punches go first so the server sees them in order
    let has_pending = !lock_queue(&ctx.queue)?.is_empty();
    if ctx.monitor.is_connected() && has_pending {
        ctx.engine.sync()?;
    }

    let mut client = ctx.punch_client(cfg, location)?;
    let outcome = client.submit_punch(&worker, kind)?;

    if let PunchOutcome::Accepted(session) = &outcome {
        println!(
            "🕘 Session #{} opened at {}",
            session.id,
            session.opened_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let (Some(closed), Some(mins)) = (session.closed_at, session.duration_minutes()) {
            println!(
                "🕔 Closed at {} (worked {})",
                closed.format("%Y-%m-%d %H:%M:%S"),
                format_minutes(mins)
            );
        }
    }
    println!("{}", client.display().label(client.now_local()));

    Ok(())
}
