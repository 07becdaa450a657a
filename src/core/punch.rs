//! Server punch state machine: per worker `Closed → Open → Closed`.
//!
//! Both transitions run inside an IMMEDIATE transaction that re-reads the
//! open-session state before writing, so two concurrent time-ins for the same
//! worker are serialized by SQLite and the second one observes the first.

use crate::db::log::ttlog;
use crate::db::queries::{
    NewSession, close_session, ensure_worker, find_open_session, insert_open_session,
    is_clocked_in, load_session, set_clocked_in,
};
use crate::errors::{AppError, AppResult};
use crate::models::punch_kind::PunchKind;
use crate::models::session::TimeLogSession;
use crate::models::wire::{PunchRequest, WorkerStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{Connection, ErrorCode, TransactionBehavior};

pub struct PunchLogic;

/// Validate the body against the endpoint and return the device-local punch time.
fn punch_time(req: &PunchRequest, expected: PunchKind) -> AppResult<NaiveDateTime> {
    if req.worker_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("workerId is required".into()));
    }
    if PunchKind::from_is_time_in(req.is_time_in) != expected {
        return Err(AppError::InvalidRequest(format!(
            "isTimeIn must be {} for {}",
            expected.is_time_in(),
            expected.endpoint()
        )));
    }

    let date = NaiveDate::parse_from_str(&req.date, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(req.date.clone()))?;
    let time = NaiveTime::parse_from_str(&req.time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&req.time, "%H:%M"))
        .map_err(|_| AppError::InvalidTime(req.time.clone()))?;

    Ok(date.and_time(time))
}

/// A lost race against the unique open-session index reads as a conflict.
fn open_session_conflict(err: AppError) -> AppError {
    match err {
        AppError::Db(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            AppError::AlreadyTimedIn
        }
        other => other,
    }
}

impl PunchLogic {
    /// `Closed → Open`. Fails with [`AppError::AlreadyTimedIn`] when a session is open.
    pub fn time_in(
        conn: &mut Connection,
        req: &PunchRequest,
        now: DateTime<Utc>,
    ) -> AppResult<TimeLogSession> {
        let opened_at = punch_time(req, PunchKind::TimeIn)?;
        let worker = req.worker_id.as_str();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        ensure_worker(&tx, worker)?;

        if find_open_session(&tx, worker)?.is_some() {
            log::info!("time-in rejected for {}: session already open", worker);
            return Err(AppError::AlreadyTimedIn);
        }

        let id = insert_open_session(
            &tx,
            &NewSession {
                worker_id: worker,
                opened_at,
                time_zone: &req.time_zone,
                device: &req.device_info,
                location: req.location,
            },
        )
        .map_err(open_session_conflict)?;

        set_clocked_in(&tx, worker, true, now)?;
        ttlog(
            &tx,
            "time_in",
            worker,
            &format!("Session {} opened at {} ({})", id, opened_at, req.time_zone),
        )?;

        let session = load_session(&tx, id)?;
        tx.commit()?;

        log::info!("time-in accepted for {} (session {})", worker, id);
        Ok(session)
    }

    /// `Open → Closed`. Fails with [`AppError::NoActiveTimeIn`] when nothing is open.
    pub fn time_out(
        conn: &mut Connection,
        req: &PunchRequest,
        now: DateTime<Utc>,
    ) -> AppResult<TimeLogSession> {
        let closed_at = punch_time(req, PunchKind::TimeOut)?;
        let worker = req.worker_id.as_str();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(open) = find_open_session(&tx, worker)? else {
            log::info!("time-out rejected for {}: no open session", worker);
            return Err(AppError::NoActiveTimeIn);
        };

        close_session(&tx, open.id, closed_at, &req.device_info, req.location)?;
        set_clocked_in(&tx, worker, false, now)?;
        ttlog(
            &tx,
            "time_out",
            worker,
            &format!("Session {} closed at {}", open.id, closed_at),
        )?;

        let session = load_session(&tx, open.id)?;
        tx.commit()?;

        log::info!("time-out accepted for {} (session {})", worker, open.id);
        Ok(session)
    }

    /// Dispatch on the request's own `isTimeIn` flag.
    pub fn apply(
        conn: &mut Connection,
        req: &PunchRequest,
        now: DateTime<Utc>,
    ) -> AppResult<TimeLogSession> {
        match PunchKind::from_is_time_in(req.is_time_in) {
            PunchKind::TimeIn => Self::time_in(conn, req, now),
            PunchKind::TimeOut => Self::time_out(conn, req, now),
        }
    }

    pub fn status(conn: &Connection, worker_id: &str) -> AppResult<WorkerStatus> {
        Ok(WorkerStatus {
            worker_id: worker_id.to_string(),
            is_clocked_in: is_clocked_in(conn, worker_id)?,
            open_session: find_open_session(conn, worker_id)?,
        })
    }
}
