//! Device-side inputs captured with every punch: clock, position, identity.

use crate::errors::{AppError, AppResult};
use crate::models::location::GeoPoint;
use chrono::{DateTime, FixedOffset, Local};

pub trait Clock: Send + Sync {
    /// Device-local time, offset included.
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

pub trait Geolocator: Send + Sync {
    fn locate(&self) -> AppResult<GeoPoint>;
}

/// Position taken from configuration or command-line flags.
/// No position configured is treated like a denied location permission.
pub struct FixedLocation(pub Option<GeoPoint>);

impl Geolocator for FixedLocation {
    fn locate(&self) -> AppResult<GeoPoint> {
        self.0.ok_or_else(|| {
            AppError::Permission(
                "no device location available; set latitude/longitude or pass --lat/--lon".into(),
            )
        })
    }
}

pub struct DeviceContext {
    pub descriptor: String,
    pub time_zone: String,
    pub clock: Box<dyn Clock>,
    pub geolocator: Box<dyn Geolocator>,
}

impl DeviceContext {
    pub fn new(
        descriptor: &str,
        time_zone: &str,
        clock: Box<dyn Clock>,
        geolocator: Box<dyn Geolocator>,
    ) -> Self {
        Self {
            descriptor: descriptor.to_string(),
            time_zone: time_zone.to_string(),
            clock,
            geolocator,
        }
    }

    /// Descriptor sent as `deviceInfo` when none is configured.
    pub fn default_descriptor() -> String {
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| "unknown-host".to_string());
        format!(
            "rpunch/{} ({}; {})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            host
        )
    }
}
