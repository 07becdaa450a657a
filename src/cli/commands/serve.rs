use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::server;

/// Run the punch server until Ctrl-C.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { bind } = cmd {
        let addr = bind.clone().unwrap_or_else(|| cfg.bind.clone());
        println!("🛰️  rPunch server on {} (db: {})", addr, cfg.database);
        server::serve(&addr, &cfg.database, &cfg.api_token)?;
    }
    Ok(())
}
