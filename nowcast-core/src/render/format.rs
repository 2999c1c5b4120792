//! Display strings for each region.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::model::{PlaceInfo, UvIndex};

const MPS_TO_KMH: f64 = 3.6;

/// Upper-case the first character and leave the rest as is.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn location(place: &PlaceInfo) -> String {
    format!("{}, {}", place.city, place.country)
}

/// Long-form local date, e.g. "Wednesday, Oct 14, 09:05".
pub fn date<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%A, %b %-d, %H:%M").to_string()
}

pub fn temperature(celsius: f64) -> String {
    format!("{}°", round_display(celsius))
}

pub fn humidity(pct: u8) -> String {
    format!("{pct}%")
}

pub fn wind(speed_mps: f64) -> String {
    format!("{} km/h", round_display(speed_mps * MPS_TO_KMH))
}

pub fn uv(index: UvIndex) -> String {
    index.to_string()
}

pub fn pressure(hpa: u32) -> String {
    format!("{hpa} hPa")
}

pub fn visibility(meters: f64) -> String {
    format!("{} km", one_decimal(meters / 1000.0))
}

/// One fractional digit. Values exactly halfway between two candidates go
/// away from zero (1.25 becomes "1.3"); everything else is the nearest decimal.
pub fn one_decimal(value: f64) -> String {
    // Only odd multiples of 0.25 sit exactly on a tie; scaling by 4 is exact.
    let quarters = value * 4.0;
    let is_tie = quarters.fract() == 0.0 && quarters % 2.0 != 0.0;

    if is_tie {
        let tenths = (value.abs() * 10.0).ceil().copysign(value);
        format!("{:.1}", tenths / 10.0)
    } else {
        format!("{value:.1}")
    }
}

/// Nearest integer; halves go toward positive infinity, so -3.5 becomes -3.
fn round_display(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}
