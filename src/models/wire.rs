//! JSON bodies exchanged between the punch client and the punch server.

use super::location::GeoPoint;
use super::presence::{PresenceTier, RawStatus};
use super::session::TimeLogSession;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchRequest {
    pub worker_id: String,
    pub device_info: String,
    pub location: Option<GeoPoint>,
    pub date: String,
    pub time: String,
    pub time_zone: String,
    pub is_time_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchResponse {
    pub message: String,
    pub session: TimeLogSession,
}

/// Error body, and the success body of endpoints that return nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub worker_id: String,
    pub is_clocked_in: bool,
    pub open_session: Option<TimeLogSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub worker_id: String,
    pub status: RawStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceView {
    pub worker_id: String,
    pub tier: PresenceTier,
    pub tooltip: String,
}
