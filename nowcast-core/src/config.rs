use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Coordinates;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "NOWCAST_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";
pub const DEFAULT_IP_LOOKUP_BASE: &str = "http://ip-api.com";
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// How the current position is obtained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationConfig {
    /// Fixed coordinates; take precedence over IP lookup when both are set.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[serde(default = "default_true")]
    pub ip_lookup: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            ip_lookup: true,
        }
    }
}

impl LocationConfig {
    pub fn fixed(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// Base URLs of the remote services. Overridable mostly for testing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_ip_lookup_base")]
    pub ip_lookup_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            ip_lookup_base: default_ip_lookup_base(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Per-request timeout. Unset means requests wait indefinitely.
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            assets_dir: default_assets_dir(),
            request_timeout_secs: None,
            location: LocationConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve the API key: explicit override, then environment, then file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String> {
        let env = std::env::var(API_KEY_ENV).ok();
        pick_api_key(explicit, env.as_deref(), self.api_key.as_deref())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_fixed_location(&mut self, coords: Option<Coordinates>) {
        self.location.latitude = coords.map(|c| c.latitude);
        self.location.longitude = coords.map(|c| c.longitude);
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}

fn pick_api_key(explicit: Option<&str>, env: Option<&str>, file: Option<&str>) -> Result<String> {
    [explicit, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `nowcast configure` or set {API_KEY_ENV}."
            )
        })
}

fn default_true() -> bool {
    true
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_ip_lookup_base() -> String {
    DEFAULT_IP_LOOKUP_BASE.to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ASSETS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(cfg.location.ip_lookup);
        assert_eq!(cfg.endpoints.api_base, DEFAULT_API_BASE);
        assert!(cfg.request_timeout().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_fixed_location(Some(Coordinates::new(52.37, 4.89)));
        cfg.request_timeout_secs = Some(5);
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.location.fixed(), Some(Coordinates::new(52.37, 4.89)));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\n[location]\nlatitude = 1.5\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert!(cfg.location.ip_lookup);
        // Only one component set: not a fixed location.
        assert_eq!(cfg.location.fixed(), None);
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn api_key_precedence() {
        assert_eq!(pick_api_key(Some("cli"), Some("env"), Some("file")).unwrap(), "cli");
        assert_eq!(pick_api_key(None, Some("env"), Some("file")).unwrap(), "env");
        assert_eq!(pick_api_key(Some("  "), None, Some("file")).unwrap(), "file");
    }

    #[test]
    fn missing_api_key_hints_configure() {
        let err = pick_api_key(None, None, None).unwrap_err();
        assert!(err.to_string().contains("Hint: run `nowcast configure`"));
    }
}
