use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

use crate::{
    Config,
    error::GatewayError,
    gateway::openweather::OpenWeatherGateway,
    model::{Coordinates, PlaceInfo, UvIndex, WeatherSnapshot},
};

pub mod openweather;

/// Read-only access to the weather data provider.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// Place name for the coordinates. An empty result set is not an error.
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<PlaceInfo, GatewayError>;

    /// Current conditions in metric units. `uv_index` is left unavailable.
    async fn fetch_conditions(&self, coords: Coordinates) -> Result<WeatherSnapshot, GatewayError>;

    /// Best effort: any failure yields [`UvIndex::Unavailable`].
    async fn fetch_uv(&self, coords: Coordinates) -> UvIndex;
}

/// HTTP client shared by all remote lookups.
pub fn http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("nowcast/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Construct the OpenWeather gateway from config.
pub fn gateway_from_config(
    config: &Config,
    api_key: String,
    http: Client,
) -> Box<dyn WeatherGateway> {
    Box::new(
        OpenWeatherGateway::new(api_key)
            .with_http(http)
            .with_base_url(&config.endpoints.api_base),
    )
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
