use serde::{Deserialize, Serialize};

/// Manually chosen (or defaulted) status persisted for a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawStatus {
    Active,
    Away,
    Offline,
}

impl RawStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RawStatus::Active => "active",
            RawStatus::Away => "away",
            RawStatus::Offline => "offline",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(RawStatus::Active),
            "away" => Some(RawStatus::Away),
            "offline" => Some(RawStatus::Offline),
            _ => None,
        }
    }
}

/// Coarse label shown to other users, computed at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceTier {
    Active,
    Away,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub tier: PresenceTier,
    pub tooltip: String,
}
