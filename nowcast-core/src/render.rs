use chrono::{DateTime, TimeZone};
use std::fmt::{self, Display};

use crate::{
    animation::AnimationPayload,
    model::{PlaceInfo, WeatherSnapshot},
};

pub mod format;

/// Container the animation is bound to.
pub const ANIMATION_CONTAINER: &str = "weatherIllustration";

/// Named output areas of the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Location,
    Date,
    Temperature,
    FeelsLike,
    ConditionMain,
    ConditionDetail,
    Humidity,
    Wind,
    Uv,
    Pressure,
    Visibility,
}

impl Region {
    pub const fn all() -> &'static [Region] {
        &[
            Region::Location,
            Region::Date,
            Region::Temperature,
            Region::FeelsLike,
            Region::ConditionMain,
            Region::ConditionDetail,
            Region::Humidity,
            Region::Wind,
            Region::Uv,
            Region::Pressure,
            Region::Visibility,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Location => "Location",
            Region::Date => "Date",
            Region::Temperature => "Temperature",
            Region::FeelsLike => "Feels like",
            Region::ConditionMain => "Condition",
            Region::ConditionDetail => "Details",
            Region::Humidity => "Humidity",
            Region::Wind => "Wind",
            Region::Uv => "UV index",
            Region::Pressure => "Pressure",
            Region::Visibility => "Visibility",
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub trait DisplaySurface {
    fn set_text(&mut self, region: Region, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Svg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub container: &'static str,
    pub mode: RenderMode,
    pub looping: bool,
    pub autoplay: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            container: ANIMATION_CONTAINER,
            mode: RenderMode::Svg,
            looping: true,
            autoplay: true,
        }
    }
}

/// A live animation. Dropping the handle without calling `destroy` leaks
/// whatever the player allocated for it.
pub trait AnimationHandle: Send {
    fn destroy(self: Box<Self>);
}

pub trait AnimationPlayer {
    fn create(
        &mut self,
        options: &PlaybackOptions,
        payload: AnimationPayload,
    ) -> Box<dyn AnimationHandle>;
}

/// Everything one render needs, fetched up front.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub place: PlaceInfo,
    pub weather: WeatherSnapshot,
    pub animation: AnimationPayload,
}

/// Writes a snapshot to the surface and owns the single animation instance.
pub struct Renderer<S, P> {
    surface: S,
    player: P,
    options: PlaybackOptions,
    current: Option<Box<dyn AnimationHandle>>,
}

impl<S, P> Renderer<S, P>
where
    S: DisplaySurface,
    P: AnimationPlayer,
{
    pub fn new(surface: S, player: P) -> Self {
        Self {
            surface,
            player,
            options: PlaybackOptions::default(),
            current: None,
        }
    }

    pub fn render<Tz>(&mut self, frame: RenderFrame, now: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let RenderFrame { place, weather, animation } = frame;

        let texts = [
            (Region::Location, format::location(&place)),
            (Region::Date, format::date(now)),
            (Region::Temperature, format::temperature(weather.temperature_c)),
            (Region::FeelsLike, format::temperature(weather.feels_like_c)),
            (Region::ConditionMain, format::capitalize(&weather.condition_main)),
            (Region::ConditionDetail, format::capitalize(&weather.condition_description)),
            (Region::Humidity, format::humidity(weather.humidity_pct)),
            (Region::Wind, format::wind(weather.wind_speed_mps)),
            (Region::Uv, format::uv(weather.uv_index)),
            (Region::Pressure, format::pressure(weather.pressure_hpa)),
            (Region::Visibility, format::visibility(weather.visibility_m)),
        ];

        for (region, text) in &texts {
            self.surface.set_text(*region, text);
        }

        self.replace_animation(animation);
    }

    /// Destroy the current instance, if any, then start the new one.
    pub fn replace_animation(&mut self, payload: AnimationPayload) {
        self.release();
        tracing::debug!(path = %payload.path, "Starting animation");
        self.current = Some(self.player.create(&self.options, payload));
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.destroy();
        }
    }

    pub fn has_animation(&self) -> bool {
        self.current.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn player(&self) -> &P {
        &self.player
    }
}

impl<S, P> Drop for Renderer<S, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.destroy();
        }
    }
}
