use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Location;

fn default_city() -> String {
    "Mecca".to_string()
}
fn default_country() -> String {
    "Saudi Arabia".to_string()
}
fn default_method() -> u8 {
    2 // ISNA
}
fn default_timings_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_geolocation_url() -> String {
    "http://ip-api.com/json".to_string()
}
fn default_interval_hours() -> u64 {
    6
}
fn default_player() -> Option<String> {
    if cfg!(target_os = "macos") {
        Some("afplay".to_string())
    } else if cfg!(target_os = "linux") {
        Some("aplay".to_string())
    } else {
        None
    }
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Calculation method id passed to the timetable API.
    #[serde(default = "default_method")]
    pub method: u8,
    /// Look the location up from the public IP at startup.
    #[serde(default = "default_true")]
    pub detect: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            country: default_country(),
            latitude: None,
            longitude: None,
            method: default_method(),
            detect: true,
        }
    }
}

impl LocationConfig {
    pub fn initial_location(&self) -> Location {
        let loc = Location::new(self.city.clone(), self.country.clone());
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => loc.with_coordinates(lat, lon),
            _ => loc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_timings_url")]
    pub timings_url: String,
    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,
    /// Unset means the HTTP client's own default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timings_url: default_timings_url(),
            geolocation_url: default_geolocation_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.max(1) * 60 * 60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Defaults to `assets/` next to the executable.
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
    /// Command used to play `.wav` files, e.g. "aplay" or "paplay".
    #[serde(default = "default_player")]
    pub player: Option<String>,
    /// Optional full-screen image viewer, e.g. "feh --fullscreen".
    #[serde(default)]
    pub viewer: Option<String>,
    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            assets_dir: None,
            player: default_player(),
            viewer: None,
            notify: true,
        }
    }
}

impl AlertConfig {
    pub fn resolved_assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| crate::alert::assets::exe_dir().join("assets"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub alert: AlertConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "adhan").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Read-only: settings changed at runtime are never written back.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Parsing {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.location.city, "Mecca");
        assert_eq!(config.location.method, 2);
        assert!(config.location.detect);
        assert_eq!(config.refresh.interval(), Duration::from_secs(6 * 3600));
        assert!(config.api.timeout_secs.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [location]
            city = "Sarajevo"
            country = "Bosnia and Herzegovina"
            latitude = 43.85
            longitude = 18.41

            [alert]
            viewer = "feh --fullscreen"
            notify = false
            "#,
        )
        .unwrap();

        assert_eq!(config.location.country, "Bosnia and Herzegovina");
        assert_eq!(config.location.initial_location().coordinates, Some((43.85, 18.41)));
        assert_eq!(config.api.timings_url, "https://api.aladhan.com/v1");
        assert_eq!(config.alert.viewer.as_deref(), Some("feh --fullscreen"));
        assert!(!config.alert.notify);
    }

    #[test]
    fn half_coordinates_fall_back_to_city() {
        let config = AppConfig::from_toml("[location]\nlatitude = 10.0\n").unwrap();
        assert!(config.location.initial_location().coordinates.is_none());
    }

    #[test]
    fn interval_never_zero() {
        let config = AppConfig::from_toml("[refresh]\ninterval_hours = 0\n").unwrap();
        assert_eq!(config.refresh.interval(), Duration::from_secs(3600));
    }
}
