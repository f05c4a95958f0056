//! Server configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! is a valid configuration:
//!
//! ```json
//! { "bind": "0.0.0.0:3000", "turn_secs": 45, "catalog_path": "roster.json" }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use draftforge_room::{Catalog, DraftConfig};
use draftforge_tick::{ClockConfig, TickerConfig};
use serde::Deserialize;

use crate::DraftforgeError;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "DRAFTFORGE_CONFIG";
/// Environment variable overriding [`ServerConfig::bind`].
pub const BIND_ENV: &str = "DRAFTFORGE_BIND";

/// Roster used when no `catalog_path` is configured.
const BUNDLED_ROSTER: &str = include_str!("../assets/roster.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind: String,
    /// Roster JSON (group → ids). The bundled roster is used when unset.
    pub catalog_path: Option<PathBuf>,
    pub turn_secs: u32,
    pub initial_reserve_secs: i32,
    /// A side whose reserve drops below this gets a forced selection.
    pub reserve_floor_secs: i32,
    pub finished_retention_secs: u64,
    pub idle_window_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let clock = ClockConfig::default();
        Self {
            bind: "127.0.0.1:3000".to_string(),
            catalog_path: None,
            turn_secs: clock.turn_secs,
            initial_reserve_secs: clock.initial_reserve_secs,
            reserve_floor_secs: clock.reserve_floor_secs,
            finished_retention_secs: 600,
            idle_window_secs: 1800,
            sweep_interval_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Reads the file named by `DRAFTFORGE_CONFIG` (defaults if unset),
    /// then applies `DRAFTFORGE_BIND`.
    pub fn from_env() -> Result<Self, DraftforgeError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Ok(bind) = std::env::var(BIND_ENV) {
            config.bind = bind;
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, DraftforgeError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text).map_err(|source| DraftforgeError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads the configured roster, or the bundled one.
    pub fn catalog(&self) -> Result<Catalog, DraftforgeError> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::from_json(&std::fs::read_to_string(path)?)?,
            None => Catalog::from_json(BUNDLED_ROSTER)?,
        };
        tracing::info!(entities = catalog.len(), "roster loaded");
        Ok(catalog)
    }

    /// Settings handed to the draft manager.
    pub fn draft_config(&self) -> DraftConfig {
        DraftConfig {
            clock: ClockConfig {
                turn_secs: self.turn_secs,
                initial_reserve_secs: self.initial_reserve_secs,
                reserve_floor_secs: self.reserve_floor_secs,
            },
            finished_retention: Duration::from_secs(self.finished_retention_secs),
            idle_window: Duration::from_secs(self.idle_window_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
            ticker: TickerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_object_gives_defaults() {
        let config = ServerConfig::parse("{}").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.reserve_floor_secs, -5);
    }

    #[test]
    fn test_parse_partial_overrides_only_named_fields() {
        let config = ServerConfig::parse(r#"{"turn_secs": 30, "bind": "0.0.0.0:9000"}"#).unwrap();
        assert_eq!(config.turn_secs, 30);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.initial_reserve_secs, 300);
    }

    #[test]
    fn test_parse_wrong_type_fails() {
        assert!(ServerConfig::parse(r#"{"turn_secs": "soon"}"#).is_err());
    }

    #[test]
    fn test_draft_config_carries_clock_and_windows() {
        let config = ServerConfig {
            turn_secs: 10,
            idle_window_secs: 5,
            sweep_interval_secs: 0,
            ..ServerConfig::default()
        };
        let draft = config.draft_config();
        assert_eq!(draft.clock.turn_secs, 10);
        assert_eq!(draft.idle_window, Duration::from_secs(5));
        assert_eq!(draft.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_catalog_bundled_roster_loads() {
        let catalog = ServerConfig::default().catalog().unwrap();
        assert_eq!(catalog.len(), 130);
        assert!(catalog.contains(&"furina".into()));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ServerConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DraftforgeError::Io(_)));
    }
}
