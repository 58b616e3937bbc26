//! Layered configuration
//!
//! Precedence, lowest first: built-in defaults, TOML file, `CARPARK__*`
//! environment variables. CLI flags are applied on top by the binary.

use crate::pool::PoolConfig;
use crate::server::ServerConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "carpark.toml";

/// Environment variable prefix (`CARPARK__SERVER__PORT=8080`)
pub const ENV_PREFIX: &str = "CARPARK";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
    /// Write daily rolling log files here as well as to stdout
    pub directory: Option<PathBuf>,
    /// Emit JSON lines on stdout instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pool: PoolConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration
    ///
    /// An explicit `path` must exist; otherwise `carpark.toml` is read if present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        debug!(?app_config, "Configuration loaded");
        Ok(app_config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
