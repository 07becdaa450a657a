use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PunchKind {
    TimeIn,
    TimeOut,
}

impl PunchKind {
    /// Server path segment handling this kind of punch.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PunchKind::TimeIn => "time-in",
            PunchKind::TimeOut => "time-out",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PunchKind::TimeIn => "Time-In",
            PunchKind::TimeOut => "Time-Out",
        }
    }

    pub fn is_time_in(&self) -> bool {
        matches!(self, PunchKind::TimeIn)
    }

    pub fn from_is_time_in(is_time_in: bool) -> Self {
        if is_time_in {
            PunchKind::TimeIn
        } else {
            PunchKind::TimeOut
        }
    }
}
