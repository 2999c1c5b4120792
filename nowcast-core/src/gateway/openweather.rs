use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::DEFAULT_API_BASE,
    error::{GatewayError, UvFetchError},
    model::{Coordinates, PlaceInfo, UNKNOWN_CITY, UvIndex, WeatherSnapshot},
};

use super::{WeatherGateway, truncate_body};

#[derive(Debug, Clone)]
pub struct OpenWeatherGateway {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherGateway {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_API_BASE.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// GET `path` with the coordinate pair and key, returning the body of a
    /// successful response. Errors are plain messages; callers pick the variant.
    async fn get(
        &self,
        path: &str,
        coords: Coordinates,
        extra: &[(&str, &str)],
    ) -> Result<String, String> {
        let url = format!("{}{}", self.base_url, path);
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        tracing::debug!(%url, %coords, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str())])
            .query(extra)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| format!("request to {path} failed: {e}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| format!("failed to read {path} response body: {e}"))?;

        if !status.is_success() {
            return Err(format!("status {}: {}", status, truncate_body(&body)));
        }

        Ok(body)
    }

    async fn try_fetch_uv(&self, coords: Coordinates) -> Result<f64, UvFetchError> {
        let body = self
            .get("/data/2.5/uvi", coords, &[])
            .await
            .map_err(UvFetchError)?;

        let parsed: OwUvResponse = serde_json::from_str(&body)
            .map_err(|e| UvFetchError(format!("failed to parse UV JSON: {e}")))?;

        Ok(parsed.value)
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    /// Absent when the station reports nothing; treated as zero.
    #[serde(default)]
    visibility: f64,
}

#[derive(Debug, Deserialize)]
struct OwUvResponse {
    value: f64,
}

fn place_from_entries(entries: Vec<OwGeoEntry>) -> PlaceInfo {
    let Some(first) = entries.into_iter().next() else {
        return PlaceInfo::unknown();
    };

    PlaceInfo {
        city: first
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        country: first.country.unwrap_or_default(),
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<PlaceInfo, GatewayError> {
        let body = self
            .get("/geo/1.0/reverse", coords, &[("limit", "1")])
            .await
            .map_err(GatewayError::LocationLookup)?;

        let entries: Vec<OwGeoEntry> = serde_json::from_str(&body).map_err(|e| {
            GatewayError::LocationLookup(format!("failed to parse geocode JSON: {e}"))
        })?;

        let place = place_from_entries(entries);
        tracing::info!(city = %place.city, country = %place.country, "Reverse geocoded");
        Ok(place)
    }

    async fn fetch_conditions(&self, coords: Coordinates) -> Result<WeatherSnapshot, GatewayError> {
        let body = self
            .get("/data/2.5/weather", coords, &[("units", "metric")])
            .await
            .map_err(GatewayError::WeatherFetch)?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::WeatherFetch(format!("failed to parse weather JSON: {e}"))
        })?;

        let (condition_main, condition_description) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_default();

        Ok(WeatherSnapshot {
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            condition_main,
            condition_description,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            pressure_hpa: parsed.main.pressure,
            visibility_m: parsed.visibility,
            uv_index: UvIndex::Unavailable,
        })
    }

    async fn fetch_uv(&self, coords: Coordinates) -> UvIndex {
        match self.try_fetch_uv(coords).await {
            Ok(value) => UvIndex::Available(value),
            Err(e) => {
                tracing::warn!(error = %e, "UV index unavailable, showing placeholder");
                UvIndex::Unavailable
            }
        }
    }
}
