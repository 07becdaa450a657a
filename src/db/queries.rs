use crate::errors::{AppError, AppResult};
use crate::models::location::GeoPoint;
use crate::models::presence::RawStatus;
use crate::models::session::TimeLogSession;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub const SESSION_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Values written when a time-in is accepted.
pub struct NewSession<'a> {
    pub worker_id: &'a str,
    pub opened_at: NaiveDateTime,
    pub time_zone: &'a str,
    pub device: &'a str,
    pub location: Option<GeoPoint>,
}

fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_ts(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, SESSION_TS_FORMAT)
        .map_err(|_| conversion_error(AppError::InvalidDate(s.to_string())))
}

pub fn map_session_row(row: &Row) -> Result<TimeLogSession> {
    let opened_str: String = row.get("opened_at")?;
    let closed_str: Option<String> = row.get("closed_at")?;
    let open_loc: Option<String> = row.get("open_location")?;
    let close_loc: Option<String> = row.get("close_location")?;

    Ok(TimeLogSession {
        id: row.get("id")?,
        worker_id: row.get("worker_id")?,
        opened_at: parse_ts(&opened_str)?,
        closed_at: closed_str.as_deref().map(parse_ts).transpose()?,
        is_open: row.get::<_, i32>("is_open")? == 1,
        time_zone: row.get("time_zone")?,
        open_device: row.get("open_device")?,
        close_device: row.get("close_device")?,
        open_location: open_loc.as_deref().and_then(GeoPoint::from_db_str),
        close_location: close_loc.as_deref().and_then(GeoPoint::from_db_str),
    })
}

/// Auto-provision the worker row on first contact.
pub fn ensure_worker(conn: &Connection, worker_id: &str) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO workers (id, created_at) VALUES (?1, ?2)",
        params![worker_id, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Most recently opened open session; more than one should never exist.
pub fn find_open_session(conn: &Connection, worker_id: &str) -> AppResult<Option<TimeLogSession>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM time_log_sessions
         WHERE worker_id = ?1 AND is_open = 1
         ORDER BY opened_at DESC, id DESC
         LIMIT 1",
    )?;
    Ok(stmt.query_row([worker_id], map_session_row).optional()?)
}

pub fn load_session(conn: &Connection, id: i64) -> AppResult<TimeLogSession> {
    let mut stmt = conn.prepare_cached("SELECT * FROM time_log_sessions WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_session_row)?)
}

pub fn load_sessions_for_worker(conn: &Connection, worker_id: &str) -> AppResult<Vec<TimeLogSession>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM time_log_sessions
         WHERE worker_id = ?1
         ORDER BY opened_at ASC, id ASC",
    )?;

    let rows = stmt.query_map([worker_id], map_session_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_open_session(conn: &Connection, s: &NewSession) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO time_log_sessions
            (worker_id, opened_at, is_open, time_zone, open_device, open_location, created_at)
         VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6)",
        params![
            s.worker_id,
            s.opened_at.format(SESSION_TS_FORMAT).to_string(),
            s.time_zone,
            s.device,
            s.location.map(|l| l.to_db_str()),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn close_session(
    conn: &Connection,
    id: i64,
    closed_at: NaiveDateTime,
    device: &str,
    location: Option<GeoPoint>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE time_log_sessions
         SET closed_at = ?1, is_open = 0, close_device = ?2, close_location = ?3
         WHERE id = ?4",
        params![
            closed_at.format(SESSION_TS_FORMAT).to_string(),
            device,
            location.map(|l| l.to_db_str()),
            id,
        ],
    )?;
    Ok(())
}

/// Update the cached clock flag; a punch also counts as activity.
pub fn set_clocked_in(
    conn: &Connection,
    worker_id: &str,
    clocked_in: bool,
    now: DateTime<Utc>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE workers SET is_clocked_in = ?1, last_active_at = ?2 WHERE id = ?3",
        params![if clocked_in { 1 } else { 0 }, now.to_rfc3339(), worker_id],
    )?;
    Ok(())
}

pub fn is_clocked_in(conn: &Connection, worker_id: &str) -> AppResult<bool> {
    let flag: Option<i32> = conn
        .query_row(
            "SELECT is_clocked_in FROM workers WHERE id = ?1",
            [worker_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(flag == Some(1))
}

pub fn update_raw_status(
    conn: &Connection,
    worker_id: &str,
    status: RawStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE workers SET raw_status = ?1, last_active_at = ?2 WHERE id = ?3",
        params![status.to_db_str(), now.to_rfc3339(), worker_id],
    )?;
    Ok(())
}

/// Persisted presence inputs: raw status and last activity.
pub fn load_presence_inputs(
    conn: &Connection,
    worker_id: &str,
) -> AppResult<Option<(RawStatus, Option<DateTime<Utc>>)>> {
    let row: Option<(String, Option<String>)> = conn
        .query_row(
            "SELECT raw_status, last_active_at FROM workers WHERE id = ?1",
            [worker_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((raw, last)) = row else {
        return Ok(None);
    };

    let status = RawStatus::from_db_str(&raw).ok_or_else(|| AppError::InvalidStatus(raw.clone()))?;
    let last_active = match last {
        Some(s) => Some(
            DateTime::parse_from_rfc3339(&s)
                .map_err(|_| AppError::InvalidDate(s.clone()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    Ok(Some((status, last_active)))
}
