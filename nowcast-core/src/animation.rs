//! Condition keyword to illustrative animation.
//!
//! Keywords come from the provider's `weather[0].main` field. Several
//! visually similar conditions share one asset, so [`WeatherCondition`] and
//! [`AnimationAsset`] are separate enums joined by [`WeatherCondition::asset`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::{fmt::Debug, path::PathBuf, str::FromStr};

use crate::error::AnimationLoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCondition {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    Clear,
    Clouds,
}

impl WeatherCondition {
    pub const fn all() -> &'static [WeatherCondition] {
        use WeatherCondition::*;
        &[
            Thunderstorm, Drizzle, Rain, Snow, Mist, Smoke, Haze, Dust, Fog, Sand, Ash, Squall,
            Tornado, Clear, Clouds,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Thunderstorm => "thunderstorm",
            WeatherCondition::Drizzle => "drizzle",
            WeatherCondition::Rain => "rain",
            WeatherCondition::Snow => "snow",
            WeatherCondition::Mist => "mist",
            WeatherCondition::Smoke => "smoke",
            WeatherCondition::Haze => "haze",
            WeatherCondition::Dust => "dust",
            WeatherCondition::Fog => "fog",
            WeatherCondition::Sand => "sand",
            WeatherCondition::Ash => "ash",
            WeatherCondition::Squall => "squall",
            WeatherCondition::Tornado => "tornado",
            WeatherCondition::Clear => "clear",
            WeatherCondition::Clouds => "clouds",
        }
    }

    pub fn asset(&self) -> AnimationAsset {
        match self {
            WeatherCondition::Thunderstorm => AnimationAsset::Thunderstorm,
            WeatherCondition::Drizzle => AnimationAsset::Shower,
            WeatherCondition::Rain => AnimationAsset::Rain,
            WeatherCondition::Snow => AnimationAsset::Snow,
            WeatherCondition::Mist
            | WeatherCondition::Smoke
            | WeatherCondition::Haze
            | WeatherCondition::Dust
            | WeatherCondition::Fog
            | WeatherCondition::Sand
            | WeatherCondition::Ash => AnimationAsset::Mist,
            WeatherCondition::Squall | WeatherCondition::Tornado => AnimationAsset::Windy,
            WeatherCondition::Clear => AnimationAsset::Clear,
            WeatherCondition::Clouds => AnimationAsset::Cloudy,
        }
    }
}

impl FromStr for WeatherCondition {
    type Err = ();

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        WeatherCondition::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or(())
    }
}

/// Bundled animation files, one per visual bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationAsset {
    Thunderstorm,
    Shower,
    Rain,
    Snow,
    Mist,
    Windy,
    Clear,
    Cloudy,
}

impl AnimationAsset {
    pub const fn all() -> &'static [AnimationAsset] {
        use AnimationAsset::*;
        &[Thunderstorm, Shower, Rain, Snow, Mist, Windy, Clear, Cloudy]
    }

    /// Path relative to the assets root.
    pub fn path(&self) -> &'static str {
        match self {
            AnimationAsset::Thunderstorm => "json/thunderstorm.json",
            AnimationAsset::Shower => "json/shower.json",
            AnimationAsset::Rain => "json/rain.json",
            AnimationAsset::Snow => "json/snow.json",
            AnimationAsset::Mist => "json/mist.json",
            AnimationAsset::Windy => "json/windy.json",
            AnimationAsset::Clear => "json/clear.json",
            AnimationAsset::Cloudy => "json/cloudy.json",
        }
    }
}

pub fn resolve_animation_asset(keyword: &str) -> AnimationAsset {
    keyword
        .parse::<WeatherCondition>()
        .map(|c| c.asset())
        .unwrap_or(AnimationAsset::Clear)
}

/// Asset path for a condition keyword; unknown keywords get the clear animation.
pub fn resolve_animation_path(keyword: &str) -> &'static str {
    resolve_animation_asset(keyword).path()
}

#[derive(Debug, Deserialize, Default)]
struct LottieHeader {
    fr: Option<f64>,
    ip: Option<f64>,
    op: Option<f64>,
    nm: Option<String>,
}

/// A parsed animation document, handed to the player untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPayload {
    pub path: String,
    pub name: Option<String>,
    pub frame_rate: f64,
    pub in_point: f64,
    pub out_point: f64,
    pub data: Value,
}

impl AnimationPayload {
    pub fn from_json(path: &str, bytes: &[u8]) -> Result<Self, AnimationLoadError> {
        let data: Value = serde_json::from_slice(bytes)
            .map_err(|e| AnimationLoadError(format!("{path}: invalid JSON: {e}")))?;

        if !data.is_object() {
            return Err(AnimationLoadError(format!("{path}: expected a JSON object")));
        }

        let header = LottieHeader::deserialize(&data).unwrap_or_default();

        Ok(Self {
            path: path.to_string(),
            name: header.nm,
            frame_rate: header.fr.filter(|fr| *fr > 0.0).unwrap_or(30.0),
            in_point: header.ip.unwrap_or(0.0),
            out_point: header.op.unwrap_or(0.0),
            data,
        })
    }

    /// Number of frames in one loop, at least one.
    pub fn frame_count(&self) -> u64 {
        let frames = (self.out_point - self.in_point).round();
        if frames >= 1.0 { frames as u64 } else { 1 }
    }
}

/// Fetches animation payloads by relative path.
#[async_trait]
pub trait AssetLoader: Send + Sync + Debug {
    async fn load(&self, path: &str) -> Result<AnimationPayload, AnimationLoadError>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetLoader {
    root: PathBuf,
}

impl DirAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetLoader for DirAssetLoader {
    async fn load(&self, path: &str) -> Result<AnimationPayload, AnimationLoadError> {
        let full = self.root.join(path);
        let bytes = tokio::fs::read(&full)
            .await
            .map_err(|e| AnimationLoadError(format!("{}: {e}", full.display())))?;

        tracing::debug!(path = %full.display(), bytes = bytes.len(), "Loaded animation asset");
        AnimationPayload::from_json(path, &bytes)
    }
}
