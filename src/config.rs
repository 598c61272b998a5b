//! Layered configuration using figment.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `<config dir>/taskboard/config.toml`
//! 3. `./.taskboard.toml`
//! 4. `TASKBOARD_*` environment variables, `__` separating nested keys
//!    (`TASKBOARD_USER__EMAIL` -> `user.email`)

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fields::{SortOrder, ViewMode};
use crate::identity::UserIdentity;

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Snapshot file; defaults to `<data dir>/taskboard/tasks.json`.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub default_view: ViewMode,

    #[serde(default)]
    pub sort: SortOrder,

    /// tracing filter directive used when `TASKBOARD_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub user: Option<UserIdentity>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            default_view: ViewMode::default(),
            sort: SortOrder::default(),
            log_level: default_log_level(),
            user: None,
        }
    }
}

impl TrackerConfig {
    /// Load from every source.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The provider chain, exposed so tests can layer on top of it.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                figment = figment.merge(Toml::file(global));
            }
        }
        figment
            .merge(Toml::file(".taskboard.toml"))
            .merge(Env::prefixed("TASKBOARD_").split("__").ignore(&["log"]))
    }

    /// Snapshot path after applying the default.
    pub fn data_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(Self::default_data_path)
    }

    fn default_data_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskboard")
            .join("tasks.json")
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskboard").join("config.toml"))
    }
}
