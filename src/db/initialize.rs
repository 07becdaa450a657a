use crate::db::migrate::{run_pending_migrations, run_queue_migrations};
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Initialize the punch server database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))
}

/// Initialize the device-local queue database.
pub fn init_queue_db(conn: &Connection) -> AppResult<()> {
    run_queue_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))
}
