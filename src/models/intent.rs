use super::location::GeoPoint;
use super::punch_kind::PunchKind;
use super::wire::PunchRequest;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A locally captured punch that has not been confirmed by the server yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchIntent {
    pub worker_id: String,
    pub kind: PunchKind,
    pub captured_at: DateTime<FixedOffset>,
    pub location: Option<GeoPoint>,
    pub device: String,
    pub time_zone: String,
}

impl PunchIntent {
    pub fn new(
        worker_id: &str,
        kind: PunchKind,
        captured_at: DateTime<FixedOffset>,
        location: Option<GeoPoint>,
        device: &str,
        time_zone: &str,
    ) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            kind,
            captured_at,
            location,
            device: device.to_string(),
            time_zone: time_zone.to_string(),
        }
    }

    /// Two intents occupy the same queue slot when worker and kind match.
    pub fn same_slot(&self, other: &PunchIntent) -> bool {
        self.worker_id == other.worker_id && self.kind == other.kind
    }

    /// Body sent to `time-in` / `time-out`.
    pub fn to_request(&self) -> PunchRequest {
        PunchRequest {
            worker_id: self.worker_id.clone(),
            device_info: self.device.clone(),
            location: self.location,
            date: self.captured_at.format("%Y-%m-%d").to_string(),
            time: self.captured_at.format("%H:%M:%S").to_string(),
            time_zone: self.time_zone.clone(),
            is_time_in: self.kind.is_time_in(),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} for {} at {}",
            self.kind.label(),
            self.worker_id,
            self.captured_at.format("%Y-%m-%d %H:%M")
        )
    }
}
