use crate::cli::context::ClientContext;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::presence::{PresenceTier, RawStatus};
use crate::ui::messages::success;
use crate::utils::colors::{GREEN, GREY, RESET, YELLOW};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Presence { worker, set } = cmd {
        let worker = cfg.resolve_worker(worker)?;
        let ctx = ClientContext::open(cfg, false)?;

        if let Some(raw) = set {
            let status =
                RawStatus::from_db_str(raw).ok_or_else(|| AppError::InvalidStatus(raw.clone()))?;
            ctx.transport.set_presence(&worker, status)?;
            success(format!("Status of {} set to {}.", worker, status.to_db_str()));
        }

        let view = ctx.transport.fetch_presence(&worker)?;
        let (color, label) = match view.tier {
            PresenceTier::Active => (GREEN, "Active"),
            PresenceTier::Away => (YELLOW, "Away"),
            PresenceTier::Offline => (GREY, "Offline"),
        };
        println!("● {}{}{} {} ({})", color, label, RESET, view.worker_id, view.tooltip);
    }

    Ok(())
}
