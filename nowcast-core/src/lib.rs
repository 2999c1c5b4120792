//! Core library for the `nowcast` client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location providers (fixed coordinates, IP lookup)
//! - The weather gateway over OpenWeather
//! - Condition-to-animation resolution and asset loading
//! - The renderer and the load pipeline that drives it
//!
//! It is used by `nowcast-cli`, but the display surface and animation player
//! are traits so other front-ends can plug in their own.

pub mod animation;
pub mod config;
pub mod error;
pub mod gateway;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod render;

pub use animation::{
    AnimationAsset, AnimationPayload, AssetLoader, DirAssetLoader, WeatherCondition,
};
pub use config::Config;
pub use error::{AnimationLoadError, AppError, GatewayError, LocationError, RenderError};
pub use gateway::{WeatherGateway, openweather::OpenWeatherGateway};
pub use location::LocationProvider;
pub use model::{Coordinates, PlaceInfo, UvIndex, WeatherSnapshot};
pub use pipeline::{Alerter, bootstrap, render_weather_for};
pub use render::{
    AnimationHandle, AnimationPlayer, DisplaySurface, PlaybackOptions, Region, Renderer,
};
