//! Location, fetch, render: one full run per invocation.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::{
    animation::{AssetLoader, resolve_animation_path},
    error::{AppError, RenderError},
    gateway::WeatherGateway,
    location::LocationProvider,
    model::Coordinates,
    render::{AnimationPlayer, DisplaySurface, RenderFrame, Renderer},
};

/// User-facing notification of a failed load.
pub trait Alerter {
    fn alert(&self, message: &str);
}

/// Fetch everything for `coords`, then render. Nothing reaches the surface
/// unless geocode, conditions and the animation asset all succeed.
///
/// `clock` is read once, right before rendering.
pub async fn render_weather_for<S, P, Tz>(
    gateway: &dyn WeatherGateway,
    assets: &dyn AssetLoader,
    renderer: &mut Renderer<S, P>,
    coords: Coordinates,
    clock: impl FnOnce() -> DateTime<Tz>,
) -> Result<(), RenderError>
where
    S: DisplaySurface,
    P: AnimationPlayer,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (place, mut weather) = tokio::try_join!(
        gateway.reverse_geocode(coords),
        gateway.fetch_conditions(coords),
    )?;

    weather.uv_index = gateway.fetch_uv(coords).await;

    let path = resolve_animation_path(&weather.condition_main);
    tracing::info!(condition = %weather.condition_main, %path, "Resolved animation");

    let animation = assets.load(path).await?;

    renderer.render(RenderFrame { place, weather, animation }, &clock());
    Ok(())
}

/// Page-load equivalent. Any failure is alerted once and logged; there is no retry.
pub async fn bootstrap<S, P, Tz>(
    location: &dyn LocationProvider,
    gateway: &dyn WeatherGateway,
    assets: &dyn AssetLoader,
    renderer: &mut Renderer<S, P>,
    alerter: &dyn Alerter,
    clock: impl FnOnce() -> DateTime<Tz>,
) -> Result<(), AppError>
where
    S: DisplaySurface,
    P: AnimationPlayer,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let result = async {
        let coords = location.current_location().await?;
        tracing::info!(%coords, "Position acquired");
        render_weather_for(gateway, assets, renderer, coords, clock).await?;
        Ok::<_, AppError>(())
    }
    .await;

    if let Err(err) = &result {
        tracing::error!(error = %err, "Weather load failed");
        alerter.alert(&err.user_message());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animation::AnimationPayload,
        error::{AnimationLoadError, GatewayError, LocationError},
        location::{FixedLocation, Unavailable},
        model::{PlaceInfo, UvIndex, WeatherSnapshot},
        render::{
            Region,
            testing::{CountingPlayer, MemorySurface},
        },
    };
    use async_trait::async_trait;
    use chrono::{FixedOffset, Utc};
    use std::{
        cell::RefCell,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    #[derive(Debug, Default)]
    struct FakeGateway {
        fail_geocode: bool,
        empty_geocode: bool,
        fail_conditions: bool,
        uv: Option<f64>,
        condition: &'static str,
        uv_calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherGateway for FakeGateway {
        async fn reverse_geocode(&self, _: Coordinates) -> Result<PlaceInfo, GatewayError> {
            if self.fail_geocode {
                return Err(GatewayError::LocationLookup("status 500".into()));
            }
            if self.empty_geocode {
                return Ok(PlaceInfo::unknown());
            }
            Ok(PlaceInfo { city: "Bergen".into(), country: "NO".into() })
        }

        async fn fetch_conditions(&self, _: Coordinates) -> Result<WeatherSnapshot, GatewayError> {
            if self.fail_conditions {
                return Err(GatewayError::WeatherFetch("status 401".into()));
            }
            Ok(WeatherSnapshot {
                temperature_c: 9.4,
                feels_like_c: 6.6,
                condition_main: self.condition.to_string(),
                condition_description: "light rain".into(),
                humidity_pct: 87,
                wind_speed_mps: 5.0,
                pressure_hpa: 1004,
                visibility_m: 8000.0,
                uv_index: UvIndex::Unavailable,
            })
        }

        async fn fetch_uv(&self, _: Coordinates) -> UvIndex {
            self.uv_calls.fetch_add(1, Ordering::SeqCst);
            self.uv.map(UvIndex::Available).unwrap_or(UvIndex::Unavailable)
        }
    }

    #[derive(Debug, Default)]
    struct FakeAssets {
        fail: bool,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AssetLoader for FakeAssets {
        async fn load(&self, path: &str) -> Result<AnimationPayload, AnimationLoadError> {
            self.requested.lock().unwrap().push(path.to_string());
            if self.fail {
                return Err(AnimationLoadError(format!("{path}: not found")));
            }
            AnimationPayload::from_json(path, b"{\"fr\":24,\"ip\":0,\"op\":48}")
        }
    }

    #[derive(Default)]
    struct RecordingAlerter {
        messages: RefCell<Vec<String>>,
    }

    impl Alerter for RecordingAlerter {
        fn alert(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    fn here() -> FixedLocation {
        FixedLocation(Coordinates::new(60.39, 5.32))
    }

    fn rain_gateway() -> FakeGateway {
        FakeGateway { condition: "Rain", uv: Some(1.04), ..Default::default() }
    }

    fn renderer() -> Renderer<MemorySurface, CountingPlayer> {
        Renderer::new(MemorySurface::default(), CountingPlayer::default())
    }

    #[tokio::test]
    async fn successful_load_renders_all_fields() {
        let gateway = rain_gateway();
        let assets = FakeAssets::default();
        let alerter = RecordingAlerter::default();
        let mut renderer = renderer();

        bootstrap(&here(), &gateway, &assets, &mut renderer, &alerter, Utc::now)
            .await
            .unwrap();

        let texts = &renderer.surface().texts;
        assert_eq!(texts[&Region::Location], "Bergen, NO");
        assert_eq!(texts[&Region::ConditionMain], "Rain");
        assert_eq!(texts[&Region::Wind], "18 km/h");
        assert_eq!(texts[&Region::Uv], "1.0");
        assert_eq!(*assets.requested.lock().unwrap(), vec!["json/rain.json"]);
        assert_eq!(renderer.player().counters.alive(), 1);
        assert!(alerter.messages.borrow().is_empty());
    }

    #[tokio::test]
    async fn uv_failure_still_renders_placeholder() {
        let gateway = FakeGateway { condition: "Rain", uv: None, ..Default::default() };
        let alerter = RecordingAlerter::default();
        let mut renderer = renderer();

        bootstrap(&here(), &gateway, &FakeAssets::default(), &mut renderer, &alerter, Utc::now)
            .await
            .unwrap();

        assert_eq!(renderer.surface().texts[&Region::Uv], "--");
        assert_eq!(gateway.uv_calls.load(Ordering::SeqCst), 1);
        assert!(alerter.messages.borrow().is_empty());
    }

    #[tokio::test]
    async fn empty_geocode_uses_sentinel_city() {
        let gateway = FakeGateway { empty_geocode: true, condition: "Clear", ..Default::default() };
        let mut renderer = renderer();

        let alerter = RecordingAlerter::default();
        bootstrap(&here(), &gateway, &FakeAssets::default(), &mut renderer, &alerter, Utc::now)
            .await
            .unwrap();

        assert_eq!(renderer.surface().texts[&Region::Location], "Unknown Location, ");
    }

    #[tokio::test]
    async fn unknown_condition_loads_clear_animation() {
        let gateway = FakeGateway { condition: "Volcanic", ..Default::default() };
        let assets = FakeAssets::default();
        let mut renderer = renderer();

        render_weather_for(&gateway, &assets, &mut renderer, here().0, Utc::now)
            .await
            .unwrap();

        assert_eq!(*assets.requested.lock().unwrap(), vec!["json/clear.json"]);
    }

    async fn assert_single_alert_no_writes(
        location: &dyn LocationProvider,
        gateway: &FakeGateway,
        assets: &FakeAssets,
        expected: &str,
    ) {
        let alerter = RecordingAlerter::default();
        let mut renderer = renderer();

        let err = bootstrap(location, gateway, assets, &mut renderer, &alerter, Utc::now)
            .await
            .unwrap_err();

        let messages = alerter.messages.borrow();
        assert_eq!(messages.len(), 1, "{err}");
        assert!(messages[0].contains(expected), "{}", messages[0]);
        assert_eq!(renderer.surface().writes, 0);
        assert_eq!(renderer.player().counters.created(), 0);
    }

    #[tokio::test]
    async fn geocode_failure_alerts_once() {
        let gateway = FakeGateway { fail_geocode: true, ..rain_gateway() };
        assert_single_alert_no_writes(
            &here(),
            &gateway,
            &FakeAssets::default(),
            "Failed to fetch weather: Location fetch failed",
        )
        .await;
    }

    #[tokio::test]
    async fn conditions_failure_alerts_once() {
        let gateway = FakeGateway { fail_conditions: true, ..rain_gateway() };
        assert_single_alert_no_writes(
            &here(),
            &gateway,
            &FakeAssets::default(),
            "Failed to fetch weather: Weather fetch failed",
        )
        .await;
    }

    #[tokio::test]
    async fn animation_failure_alerts_once() {
        let assets = FakeAssets { fail: true, ..Default::default() };
        assert_single_alert_no_writes(
            &here(),
            &rain_gateway(),
            &assets,
            "Failed to fetch weather: Animation load failed",
        )
        .await;
    }

    #[tokio::test]
    async fn missing_geolocation_alerts_once() {
        assert_single_alert_no_writes(
            &Unavailable,
            &rain_gateway(),
            &FakeAssets::default(),
            "Geolocation is not supported",
        )
        .await;
    }

    #[tokio::test]
    async fn denied_geolocation_skips_gateway() {
        let gateway = rain_gateway();
        let bad = FixedLocation(Coordinates::new(-91.0, 0.0));
        assert_single_alert_no_writes(
            &bad,
            &gateway,
            &FakeAssets::default(),
            "Geolocation permission denied or unavailable",
        )
        .await;
        assert_eq!(gateway.uv_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_renders_keep_one_instance() {
        let gateway = rain_gateway();
        let assets = FakeAssets::default();
        let mut renderer = renderer();
        let tz = FixedOffset::east_opt(0).unwrap();

        for _ in 0..3 {
            render_weather_for(&gateway, &assets, &mut renderer, here().0, || {
                Utc::now().with_timezone(&tz)
            })
            .await
            .unwrap();
        }

        let counters = &renderer.player().counters;
        assert_eq!(counters.created(), 3);
        assert_eq!(counters.destroyed(), 2);
        assert_eq!(counters.alive(), 1);
    }

    #[test]
    fn location_errors_convert_to_app_errors() {
        let err: AppError = LocationError::Unsupported.into();
        assert!(matches!(err, AppError::Location(LocationError::Unsupported)));
    }
}
