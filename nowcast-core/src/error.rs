use thiserror::Error;

/// Failure to obtain the user's position.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported on this host.")]
    Unsupported,

    #[error("Geolocation permission denied or unavailable: {0}")]
    PermissionOrAvailability(String),
}

/// Failure of a critical-path weather request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Location fetch failed: {0}")]
    LocationLookup(String),

    #[error("Weather fetch failed: {0}")]
    WeatherFetch(String),
}

#[derive(Debug, Error)]
#[error("Animation load failed: {0}")]
pub struct AnimationLoadError(pub String);

/// Failure of the UV lookup. Never leaves the gateway; it is downgraded to
/// [`crate::UvIndex::Unavailable`].
#[derive(Debug, Error)]
#[error("UV fetch failed: {0}")]
pub struct UvFetchError(pub String);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Animation(#[from] AnimationLoadError),
}

/// Anything that aborts a load. Each variant carries the message shown to the
/// user in the alert.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Failed to fetch weather: {0}")]
    Render(#[from] RenderError),
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Location(LocationError::Unsupported) => {
                "Geolocation is not supported on this host.".to_string()
            }
            AppError::Location(LocationError::PermissionOrAvailability(_)) => {
                "Geolocation permission denied or unavailable. Please allow location access."
                    .to_string()
            }
            AppError::Render(_) => self.to_string(),
        }
    }
}
