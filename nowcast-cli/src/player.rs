use nowcast_core::{
    AnimationAsset, AnimationHandle, AnimationPayload, AnimationPlayer, PlaybackOptions,
};
use std::{io::Write, time::Duration};
use tokio::{task::JoinHandle, time};

/// Terminal redraw rate, independent of the payload's own frame rate.
const TICKS_PER_SEC: f64 = 8.0;

/// Plays an animation as a one-line ticker on stderr.
#[derive(Debug)]
pub struct TerminalPlayer {
    enabled: bool,
}

impl TerminalPlayer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl AnimationHandle for TickerHandle {
    fn destroy(self: Box<Self>) {
        if let Some(task) = self.task {
            task.abort();
            eprintln!();
        }
    }
}

impl AnimationPlayer for TerminalPlayer {
    fn create(
        &mut self,
        options: &PlaybackOptions,
        payload: AnimationPayload,
    ) -> Box<dyn AnimationHandle> {
        if !self.enabled || !options.autoplay {
            return Box::new(TickerHandle { task: None });
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, animation not started");
            return Box::new(TickerHandle { task: None });
        };

        let looping = options.looping;
        let task = runtime.spawn(async move { tick(payload, looping).await });
        Box::new(TickerHandle { task: Some(task) })
    }
}

async fn tick(payload: AnimationPayload, looping: bool) {
    let glyphs = glyphs_for(&payload.path);
    let total = payload.frame_count();
    let step = (payload.frame_rate / TICKS_PER_SEC).max(1.0) as u64;
    let label = payload.name.clone().unwrap_or_else(|| payload.path.clone());

    let mut interval = time::interval(Duration::from_secs_f64(1.0 / TICKS_PER_SEC));
    let mut frame = 0u64;
    let mut n = 0usize;

    loop {
        interval.tick().await;

        let glyph = glyphs[n % glyphs.len()];
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{glyph} {label} {:>4}/{total}", frame + 1);
        let _ = err.flush();
        drop(err);

        n += 1;
        frame += step;
        if frame >= total {
            if !looping {
                break;
            }
            frame %= total;
        }
    }
}

fn glyphs_for(path: &str) -> &'static [&'static str] {
    let asset = AnimationAsset::all()
        .iter()
        .copied()
        .find(|a| a.path() == path)
        .unwrap_or(AnimationAsset::Clear);

    match asset {
        AnimationAsset::Thunderstorm => THUNDER,
        AnimationAsset::Shower => SHOWER,
        AnimationAsset::Rain => RAIN,
        AnimationAsset::Snow => SNOW,
        AnimationAsset::Mist => MIST,
        AnimationAsset::Windy => WINDY,
        AnimationAsset::Cloudy => CLOUDY,
        AnimationAsset::Clear => CLEAR,
    }
}

const THUNDER: &[&str] = &["⛈ ", "🌩 ", "⛈ ", "⚡"];
const SHOWER: &[&str] = &["🌦 ", "🌦 ", "🌧 "];
const RAIN: &[&str] = &["🌧 ", "☔"];
const SNOW: &[&str] = &["🌨 ", "❄ ", "❅ ", "❆ "];
const MIST: &[&str] = &["🌫 ", "≋ ", "〰"];
const WINDY: &[&str] = &["🌬 ", "🍃", "💨"];
const CLOUDY: &[&str] = &["☁ ", "⛅"];
const CLEAR: &[&str] = &["☀ ", "🌞"];

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> AnimationPayload {
        AnimationPayload::from_json("json/rain.json", br#"{"fr":16,"ip":0,"op":32}"#).unwrap()
    }

    #[test]
    fn every_asset_has_glyphs() {
        for path in ["json/rain.json", "json/clear.json", "json/unknown.json"] {
            assert!(!glyphs_for(path).is_empty());
        }
        assert_eq!(glyphs_for("json/snow.json")[1], "❄ ");
    }

    #[test]
    fn disabled_player_creates_inert_handles() {
        let mut player = TerminalPlayer::new(false);
        let handle = player.create(&PlaybackOptions::default(), payload());
        handle.destroy();
    }

    #[tokio::test]
    async fn destroy_aborts_the_ticker() {
        let mut player = TerminalPlayer::new(true);
        let handle = player.create(&PlaybackOptions::default(), payload());
        time::sleep(Duration::from_millis(20)).await;
        handle.destroy();
    }

    #[tokio::test]
    async fn non_looping_ticker_finishes_on_its_own() {
        let options = PlaybackOptions { looping: false, ..PlaybackOptions::default() };
        let task = tokio::spawn(tick(
            AnimationPayload::from_json("json/clear.json", br#"{"fr":8,"ip":0,"op":2}"#).unwrap(),
            options.looping,
        ));
        time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
    }
}
