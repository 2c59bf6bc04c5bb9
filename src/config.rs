use std::{path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::sync_service::SyncSettings;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Root directory of the scraped catalog snapshots
    pub catalog_path: String,
    #[serde(default = "default_staleness_hours")]
    pub staleness_hours: f64,
    #[serde(default = "default_pause_every")]
    pub pause_every: usize,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

fn default_staleness_hours() -> f64 { 12.0 }
fn default_pause_every() -> usize { 10 }
fn default_pause_ms() -> u64 { 1000 }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            staleness_hours: self.staleness_hours,
            pause_every: self.pause_every,
            pause: Duration::from_millis(self.pause_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn test_defaults_match_upstream_policy() {
        let config: Config = serde_json::from_str(r#"{ "catalog_path": "/var/catalog" }"#).unwrap();
        let settings = config.sync_settings();

        assert_eq!(config.catalog_path, "/var/catalog");
        assert_eq!(settings.staleness_hours, 12.0);
        assert_eq!(settings.pause_every, 10);
        assert_eq!(settings.pause, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config: Config = serde_json::from_str(
            r#"{ "catalog_path": "c", "staleness_hours": 6, "pause_every": 5, "pause_ms": 250 }"#
        ).unwrap();
        let settings = config.sync_settings();

        assert_eq!(settings.staleness_hours, 6.0);
        assert_eq!(settings.pause_every, 5);
        assert_eq!(settings.pause, Duration::from_millis(250));
    }
}
