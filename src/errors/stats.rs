use thiserror::Error;

use super::{ConfigValidationError, InitializationError};

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("Initialization error: {0}")]
    Init(#[from] InitializationError),

    #[error("I/O error: {details}")]
    Io {
        details: String,
        #[source]
        source: std::io::Error,
    },
}

impl StatsError {
    pub fn io(details: impl Into<String>, source: std::io::Error) -> Self {
        StatsError::Io {
            details: details.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for StatsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(ConfigValidationError::config(err.to_string()))
    }
}
