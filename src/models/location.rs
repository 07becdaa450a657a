use serde::{Deserialize, Serialize};

/// Device position captured with a punch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    /// Convert struct → DB string ("lat,lon")
    pub fn to_db_str(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lon)
    }

    /// Convert DB string → struct
    pub fn from_db_str(s: &str) -> Option<Self> {
        let (lat, lon) = s.split_once(',')?;
        Self::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?)
    }
}
