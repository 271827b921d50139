//! Application-level configuration loading, including the team color palette
//! and the zone count used for new rooms.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::DEFAULT_ZONE_COUNT;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SPLAT_TAG_BACK_CONFIG_PATH";
/// Zone ids are single letters, so a session cannot define more than 26.
const MAX_ZONE_COUNT: usize = 26;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    colors: Vec<String>,
    zone_count: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        colors = config.colors.len(),
                        zones = config.zone_count,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Whether `color` is one of the selectable palette entries.
    pub fn is_palette_color(&self, color: &str) -> bool {
        self.colors
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(color))
    }

    /// Selectable team colors.
    pub fn palette(&self) -> &[String] {
        &self.colors
    }

    /// Number of zones new rooms are created with.
    pub fn zone_count(&self) -> usize {
        self.zone_count
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            colors: default_palette(),
            zone_count: DEFAULT_ZONE_COUNT,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    #[serde(default)]
    colors: Option<Vec<String>>,
    #[serde(default)]
    zones: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let colors = match value.colors {
            Some(colors) if !colors.is_empty() => colors,
            Some(_) => {
                warn!("config declared an empty palette; using built-in colors");
                default_palette()
            }
            None => default_palette(),
        };

        let zone_count = match value.zones {
            Some(zones) if (1..=MAX_ZONE_COUNT).contains(&zones) => zones,
            Some(zones) => {
                warn!(
                    zones,
                    "zone count out of range (1..={MAX_ZONE_COUNT}); using default"
                );
                DEFAULT_ZONE_COUNT
            }
            None => DEFAULT_ZONE_COUNT,
        };

        Self { colors, zone_count }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in palette shipped with the binary.
fn default_palette() -> Vec<String> {
    [
        "#FF4500", // orange red
        "#2E8B57", // sea green
        "#4169E1", // royal blue
        "#FFD700", // gold
        "#DA70D6", // orchid
        "#00CED1", // dark turquoise
        "#ADFF2F", // green yellow
        "#FF69B4", // hot pink
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}
