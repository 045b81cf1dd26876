use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::query::WeeksPolicy;

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the two chart tables.
    pub data_dir: PathBuf,
    /// Weekly chart table path. Relative paths resolve against `data_dir`.
    pub chart_file: PathBuf,
    /// Joined track/artist table path. Relative paths resolve against `data_dir`.
    pub track_file: PathBuf,
    /// Length of a year ranking.
    pub top_limit: usize,
    /// How weeks on chart are counted for co-credited tracks.
    pub weeks_policy: WeeksPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            chart_file: PathBuf::from(crate::DEFAULT_CHART_FILE),
            track_file: PathBuf::from(crate::DEFAULT_TRACK_FILE),
            top_limit: crate::DEFAULT_TOP_LIMIT,
            weeks_policy: WeeksPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/chartscope/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path, falling back to defaults on any failure.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Resolve the weekly chart table path: CLI > config.
    pub fn chart_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.unwrap_or_else(|| self.data_dir.join(&self.chart_file))
    }

    /// Resolve the joined track/artist table path: CLI > config.
    pub fn track_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.unwrap_or_else(|| self.data_dir.join(&self.track_file))
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
