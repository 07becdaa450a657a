//! Local on/off-clock projection and its elapsed-time ticker.

use crate::errors::AppResult;
use crate::models::punch_kind::PunchKind;
use crate::models::wire::WorkerStatus;
use crate::store::kv::KeyValueStore;
use crate::utils::time::format_elapsed;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const CLOCK_STATE_KEY: &str = "clock_state";

/// Best-effort local view; the server's open session is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockDisplay {
    pub on_the_clock: bool,
    /// Device-local wall-clock time of the time-in that started the ticker.
    pub since: Option<NaiveDateTime>,
}

impl ClockDisplay {
    pub fn load(store: &dyn KeyValueStore) -> AppResult<Self> {
        Ok(match store.get(CLOCK_STATE_KEY)? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Self::default(),
        })
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> AppResult<()> {
        store.put(CLOCK_STATE_KEY, &serde_json::to_string(self)?)
    }

    /// Flip the display for a punch: time-in starts the ticker, time-out stops it.
    pub fn apply(&mut self, kind: PunchKind, at: NaiveDateTime) {
        match kind {
            PunchKind::TimeIn => {
                self.on_the_clock = true;
                self.since = Some(at);
            }
            PunchKind::TimeOut => {
                self.on_the_clock = false;
                self.since = None;
            }
        }
    }

    /// Rebuild from the server's view of the worker.
    pub fn from_status(status: &WorkerStatus) -> Self {
        match &status.open_session {
            Some(s) => Self {
                on_the_clock: true,
                since: Some(s.opened_at),
            },
            None => Self::default(),
        }
    }

    pub fn elapsed(&self, now: NaiveDateTime) -> Option<Duration> {
        if !self.on_the_clock {
            return None;
        }
        self.since.map(|s| (now - s).max(Duration::zero()))
    }

    /// Ticker text: "On the clock 01:02:03" or "Off the clock".
    pub fn label(&self, now: NaiveDateTime) -> String {
        match self.elapsed(now) {
            Some(d) => format!("On the clock {}", format_elapsed(d.num_seconds())),
            None if self.on_the_clock => "On the clock".to_string(),
            None => "Off the clock".to_string(),
        }
    }
}
