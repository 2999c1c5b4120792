use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Password};
use nowcast_core::{
    AppError, Config, Coordinates, DirAssetLoader, Renderer, gateway, location,
    pipeline::bootstrap,
};
use std::path::PathBuf;

use crate::{
    player::TerminalPlayer,
    terminal::{StderrAlerter, TerminalSurface},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "Current weather where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key and location source.
    Configure,

    /// Show current conditions for your location.
    Show(ShowArgs),

    /// Print the config file location.
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Latitude; skips location lookup when given together with --lon.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude; requires --lat.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// OpenWeather API key, overriding config and environment.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Directory holding the `json/*.json` animation files.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Print conditions and exit without playing the animation.
    #[arg(long)]
    pub no_animation: bool,
}

impl ShowArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// A failure the user has already been alerted about. `main` turns it into a
/// non-zero exit status without printing it a second time.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Reported(pub AppError);

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show(args) => show(args).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.resolve_api_key(args.api_key.as_deref())?;

    let http = gateway::http_client(config.request_timeout())
        .context("Failed to build HTTP client")?;

    let location =
        location::location_provider_from_config(&config, args.coordinates(), http.clone());
    let weather = gateway::gateway_from_config(&config, api_key, http);
    let assets_dir = args.assets.clone().unwrap_or_else(|| config.assets_dir.clone());
    let assets = DirAssetLoader::new(assets_dir);

    let animate = !args.no_animation;
    let mut renderer = Renderer::new(TerminalSurface::default(), TerminalPlayer::new(animate));

    bootstrap(
        location.as_ref(),
        weather.as_ref(),
        &assets,
        &mut renderer,
        &StderrAlerter,
        chrono::Local::now,
    )
    .await
    .map_err(Reported)?;

    renderer
        .surface()
        .print(&mut std::io::stdout().lock())
        .context("Failed to write to stdout")?;

    if animate {
        eprintln!("(Ctrl-C to quit)");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
    }

    renderer.release();
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let fixed = Confirm::new("Use fixed coordinates instead of looking up your location?")
        .with_default(config.location.fixed().is_some())
        .prompt()?;

    if fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()?;

        let coords = Coordinates::new(latitude, longitude);
        if !coords.is_valid() {
            bail!("Coordinates out of range: {coords}");
        }
        config.set_fixed_location(Some(coords));
    } else {
        config.set_fixed_location(None);
        config.location.ip_lookup = Confirm::new("Look up your location from your IP address?")
            .with_default(config.location.ip_lookup)
            .prompt()?;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
