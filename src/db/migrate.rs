use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create the `workers` table: cached clock flag plus persisted presence inputs.
fn create_workers_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            id              TEXT PRIMARY KEY,
            is_clocked_in   INTEGER NOT NULL DEFAULT 0,
            raw_status      TEXT NOT NULL DEFAULT 'active'
                            CHECK(raw_status IN ('active','away','offline')),
            last_active_at  TEXT,
            created_at      TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Create the `time_log_sessions` table.
fn create_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS time_log_sessions (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id       TEXT NOT NULL REFERENCES workers(id),
            opened_at       TEXT NOT NULL,
            closed_at       TEXT,
            is_open         INTEGER NOT NULL DEFAULT 1 CHECK(is_open IN (0,1)),
            time_zone       TEXT NOT NULL DEFAULT 'UTC',
            open_device     TEXT NOT NULL DEFAULT '',
            close_device    TEXT,
            open_location   TEXT,
            close_location  TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_worker_opened
            ON time_log_sessions(worker_id, opened_at);
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Storage-level guard for the one-open-session-per-worker rule.
fn migrate_add_open_session_index(conn: &Connection) -> Result<()> {
    let version = "20250301_0002_unique_open_session";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_open
            ON time_log_sessions(worker_id) WHERE is_open = 1;
        "#,
    )?;

    mark_applied(conn, version, "Added unique open-session index")?;
    success(format!(
        "Migration applied: {} → at most one open session per worker",
        version
    ));

    Ok(())
}

/// Public entry point for the punch server database: run all pending migrations.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    if !table_exists(conn, "workers")? {
        create_workers_table(conn)?;
        success("Created workers table.");
    }

    if !table_exists(conn, "time_log_sessions")? {
        create_sessions_table(conn)?;
        success("Created time_log_sessions table.");
    }

    migrate_add_open_session_index(conn)?;

    Ok(())
}

/// Schema of the device-local store: one key/value table holding serialized blobs.
pub fn run_queue_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key         TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}
