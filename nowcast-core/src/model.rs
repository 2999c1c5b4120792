use serde::{Deserialize, Serialize};
use std::fmt;

use crate::render::format::one_decimal;

/// City name used when reverse geocoding returns no usable entry.
pub const UNKNOWN_CITY: &str = "Unknown Location";

/// Display value for data that could not be fetched.
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both components are finite and inside their geographic range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub city: String,
    pub country: String,
}

impl PlaceInfo {
    pub fn unknown() -> Self {
        Self {
            city: UNKNOWN_CITY.to_string(),
            country: String::new(),
        }
    }
}

/// UV index, or the placeholder when the lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum UvIndex {
    Available(f64),
    #[default]
    Unavailable,
}

impl fmt::Display for UvIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UvIndex::Available(value) => f.write_str(&one_decimal(*value)),
            UvIndex::Unavailable => f.write_str(PLACEHOLDER),
        }
    }
}

/// Current conditions at a single point in time. Metric units throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    pub visibility_m: f64,
    pub uv_index: UvIndex,
}
