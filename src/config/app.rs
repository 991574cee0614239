use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use config::{
    builder::DefaultState, Config as ConfigBuilder, ConfigBuilder as Builder, ConfigError,
    Environment, File, FileFormat,
};

use crate::ConfigValidationError;

use super::{BackendConfig, HttpConfig, LoggingConfig, StatsConfig};

/// Main application configuration
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Stats endpoint configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Aggregate reporting configuration
    #[serde(default)]
    pub stats: StatsConfig,
}

impl Config {
    /// Default configuration directory
    pub const CONFIG_DIR: &'static str = "config";

    /// Environment variable prefix
    const ENV_PREFIX: &'static str = "GOGEN_STATS";

    /// Build configuration using the following priority (highest to lowest):
    /// 1. Environment variables (GOGEN_STATS_*, `__` separates sections)
    /// 2. Local configuration file (config/local.yaml)
    /// 3. Environment specific file (config/{env}.yaml)
    /// 4. Default configuration (config/default.yaml)
    /// 5. Built-in defaults
    pub fn new() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Self::with_defaults(ConfigBuilder::builder())?
            // Load default config file
            .add_source(
                File::new(&format!("{}/default", Self::CONFIG_DIR), FileFormat::Yaml)
                    .required(false),
            )
            // Load environment specific config
            .add_source(
                File::new(
                    &format!("{}/{}", Self::CONFIG_DIR, environment),
                    FileFormat::Yaml,
                )
                .required(false),
            )
            // Load local overrides
            .add_source(
                File::new(&format!("{}/local", Self::CONFIG_DIR), FileFormat::Yaml).required(false),
            )
            .add_source(Self::environment())
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let config = Self::with_defaults(ConfigBuilder::builder())?
            // Load the specified config file
            .add_source(File::from(path))
            // Add env vars as overrides
            .add_source(Self::environment())
            .build()?;

        Self::finish(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix(Self::ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn with_defaults(builder: Builder<DefaultState>) -> Result<Builder<DefaultState>, ConfigError> {
        let defaults = Config::default();

        builder
            // Backend configuration
            .set_default("backend.url", defaults.backend.url)?
            .set_default("backend.event_buffer", defaults.backend.event_buffer as i64)?
            .set_default(
                "backend.reconnect.interval",
                format!("{}ms", defaults.backend.reconnect.interval.as_millis()),
            )?
            // HTTP configuration
            .set_default("http.enabled", defaults.http.enabled)?
            .set_default("http.bind_addr", defaults.http.bind_addr)?
            .set_default("http.bind_port", defaults.http.bind_port)?
            // Logging configuration
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default(
                "logging.include_location",
                defaults.logging.include_location,
            )?
            .set_default("logging.thread_ids", defaults.logging.thread_ids)?
            .set_default("logging.thread_names", defaults.logging.thread_names)?
            // Stats configuration
            .set_default(
                "stats.summary_interval",
                format!("{}s", defaults.stats.summary_interval.as_secs()),
            )
    }

    fn finish(config: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Self = config.try_deserialize()?;
        config
            .validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.backend.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        self.stats.validate()?;

        Ok(())
    }
}
