use super::location::GeoPoint;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Server-side record of one time-in / time-out span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogSession {
    pub id: i64,                              // ⇔ time_log_sessions.id
    pub worker_id: String,                    // ⇔ worker_id
    pub opened_at: NaiveDateTime,             // ⇔ opened_at (device-local "YYYY-MM-DD HH:MM:SS")
    pub closed_at: Option<NaiveDateTime>,     // ⇔ closed_at
    pub is_open: bool,                        // ⇔ is_open (0/1)
    pub time_zone: String,                    // ⇔ time_zone (IANA id)
    pub open_device: String,                  // ⇔ open_device
    pub close_device: Option<String>,         // ⇔ close_device
    pub open_location: Option<GeoPoint>,      // ⇔ open_location ("lat,lon")
    pub close_location: Option<GeoPoint>,     // ⇔ close_location
}

impl TimeLogSession {
    /// Worked minutes for a closed session.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.closed_at.map(|c| (c - self.opened_at).num_minutes())
    }
}
