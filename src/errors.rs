//! Unified application error type.
//! Client, server and storage code all return AppError so that the punch
//! taxonomy (permission, policy, conflict, transient, persistence) stays in
//! one place.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Punch client taxonomy
    // ---------------------------
    #[error("Location permission denied: {0}")]
    Permission(String),

    #[error("Feature not available: {0}")]
    Policy(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Request rejected by the server: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    TransientNetwork(String),

    #[error("Failed to persist punch queue: {0}")]
    Persistence(String),

    // ---------------------------
    // Server punch state machine
    // ---------------------------
    #[error("User is already time-in.")]
    AlreadyTimedIn,

    #[error("No active time-in found.")]
    NoActiveTimeIn,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid presence status: {0}")]
    InvalidStatus(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Rejections caused by the single-open-session rule, on either side of the wire.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::Conflict(_) | AppError::AlreadyTimedIn | AppError::NoActiveTimeIn
        )
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::TransientNetwork(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
