//! Presence tier derivation and the server-side status operations feeding it.

use crate::db::log::ttlog;
use crate::db::queries::{ensure_worker, load_presence_inputs, update_raw_status};
use crate::errors::AppResult;
use crate::models::presence::{Presence, PresenceTier, RawStatus};
use chrono::{DateTime, Duration, Local, Utc};
use rusqlite::Connection;

/// Last activity within this window keeps an Active worker shown as active.
pub fn active_window() -> Duration {
    Duration::minutes(5)
}

/// Past this age an Active worker is shown offline.
pub fn away_window() -> Duration {
    Duration::hours(24)
}

fn offline() -> Presence {
    Presence {
        tier: PresenceTier::Offline,
        tooltip: "Offline".to_string(),
    }
}

/// Human-facing age of the last activity.
pub fn relative_time(last_active_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now - last_active_at;

    if age < Duration::minutes(1) {
        "Just now".to_string()
    } else if age < Duration::minutes(60) {
        match age.num_minutes() {
            1 => "1 minute ago".to_string(),
            n => format!("{} minutes ago", n),
        }
    } else {
        last_active_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// Compute tier and tooltip from the persisted inputs. Pure.
pub fn derive(
    raw_status: RawStatus,
    last_active_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Presence {
    match raw_status {
        RawStatus::Offline => offline(),
        RawStatus::Away => Presence {
            tier: PresenceTier::Away,
            tooltip: last_active_at
                .map(|last| relative_time(last, now))
                .unwrap_or_else(|| "Away".to_string()),
        },
        RawStatus::Active => {
            let Some(last) = last_active_at else {
                return offline();
            };
            let age = now - last;
            if age <= active_window() {
                Presence {
                    tier: PresenceTier::Active,
                    tooltip: "Active now".to_string(),
                }
            } else if age <= away_window() {
                Presence {
                    tier: PresenceTier::Away,
                    tooltip: relative_time(last, now),
                }
            } else {
                offline()
            }
        }
    }
}

pub struct PresenceLogic;

impl PresenceLogic {
    /// Persist a manually chosen status; choosing one counts as activity.
    pub fn set_status(
        conn: &Connection,
        worker_id: &str,
        status: RawStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        ensure_worker(conn, worker_id)?;
        update_raw_status(conn, worker_id, status, now)?;
        ttlog(conn, "presence", worker_id, &format!("Status set to {}", status.to_db_str()))?;
        Ok(())
    }

    /// Read the persisted inputs and derive the current tier.
    /// Unknown workers have never been active and read as offline.
    pub fn presence(conn: &Connection, worker_id: &str, now: DateTime<Utc>) -> AppResult<Presence> {
        Ok(match load_presence_inputs(conn, worker_id)? {
            Some((raw, last)) => derive(raw, last, now),
            None => offline(),
        })
    }
}
