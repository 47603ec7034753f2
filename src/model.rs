use crate::geometry::LonLat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One active radius search. `None` at the API boundary means "no search".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub longitude: f64,
    pub latitude: f64,
    /// Search radius in meters.
    pub radius: f64,
}

impl SearchInfo {
    pub fn new(longitude: f64, latitude: f64, radius: f64) -> Self {
        Self {
            longitude,
            latitude,
            radius,
        }
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }

    /// Whether the coordinates can be drawn at all. A non-positive radius is
    /// still drawable (as a collapsed circle), so it does not fail this check.
    pub fn has_finite_coordinates(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.radius.is_finite()
    }
}

/// A position record returned by the external radius query. Read-only to the
/// overlay; optional fields absent in the wire payload stay `None` and are
/// omitted from popups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPoint {
    pub id: i64,
    pub device_id: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub fix_time: DateTime<Utc>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    /// Device display name, joined in by the caller when available.
    #[serde(default)]
    pub device_name: Option<String>,
}

impl ResultPoint {
    pub fn position(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }
}
