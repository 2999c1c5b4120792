use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{Config, config::DEFAULT_IP_LOOKUP_BASE, error::LocationError, model::Coordinates};

/// Source of a single position fix.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// Coordinates supplied up front, from flags or the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        if !self.0.is_valid() {
            return Err(LocationError::PermissionOrAvailability(format!(
                "coordinates out of range: {}",
                self.0
            )));
        }
        Ok(self.0)
    }
}

/// No way to determine a position on this host.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl LocationProvider for Unavailable {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    base_url: String,
    http: Client,
}

impl IpLocation {
    pub fn new(http: Client) -> Self {
        Self {
            base_url: DEFAULT_IP_LOOKUP_BASE.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json", self.base_url.trim_end_matches('/'));
        let unavailable = LocationError::PermissionOrAvailability;

        let res = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon,city")])
            .send()
            .await
            .map_err(|e| unavailable(format!("IP lookup request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(unavailable(format!("IP lookup returned status {status}")));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| unavailable(format!("IP lookup response malformed: {e}")))?;

        if body.status != "success" {
            return Err(unavailable(format!(
                "IP lookup reported failure: {}",
                body.message.unwrap_or_else(|| body.status.clone())
            )));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(unavailable("IP lookup response missing coordinates".into()));
        };

        let coords = Coordinates::new(lat, lon);
        tracing::info!(
            city = body.city.as_deref().unwrap_or("?"),
            %coords,
            "Located via IP lookup"
        );
        Ok(coords)
    }
}

/// Pick the location source. `explicit` wins over anything in the config.
pub fn location_provider_from_config(
    config: &Config,
    explicit: Option<Coordinates>,
    http: Client,
) -> Box<dyn LocationProvider> {
    if let Some(coords) = explicit.or_else(|| config.location.fixed()) {
        return Box::new(FixedLocation(coords));
    }

    if config.location.ip_lookup {
        return Box::new(IpLocation::new(http).with_base_url(&config.endpoints.ip_lookup_base));
    }

    Box::new(Unavailable)
}
