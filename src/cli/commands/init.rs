use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::{init_db, init_queue_db};
use crate::db::log;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped with `--test`)
///  - the server database with all pending migrations
///  - the device-local queue database
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.queue_db.clone(), cli.test)?;

    println!("⚙️  Initializing rPunch…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Server DB  : {}", &cfg.database);
    println!("📥 Queue DB   : {}", &cfg.queue_database);

    let conn = Connection::open(&cfg.database)?;
    init_db(&conn)?;

    if let Err(e) = log::ttlog(
        &conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    ) {
        eprintln!("⚠️ Failed to write internal log: {}", e);
    }

    let queue_conn = Connection::open(&cfg.queue_database)?;
    init_queue_db(&queue_conn)?;

    println!("🎉 rPunch initialization completed!");
    Ok(())
}
