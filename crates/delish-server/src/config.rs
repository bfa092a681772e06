//! Layered configuration for the Delish binary.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, then
//! `DELISH_`-prefixed environment variables with `__` separating nested
//! keys (`DELISH_SERVER__PHOTO_WIDTH=640`).

use std::path::{Path, PathBuf};

use delish_db::DbConfig;
use delish_web::ServerConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Config file read when no `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "delish.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub telemetry: TelemetryConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "delish=info,tower_http=info".into(),
            json_logs: false,
        }
    }
}

impl Config {
    /// All configuration sources, merged in precedence order.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("DELISH_").split("__"))
    }

    /// Load configuration from `path`, or [`DEFAULT_CONFIG_FILE`] if `None`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::figment(&path).extract()
    }
}
