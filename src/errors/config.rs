use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend configuration error: {0}")]
    Backend(String),

    #[error("HTTP configuration error: {0}")]
    Http(String),

    #[error("Logging configuration error: {0}")]
    Logging(String),

    #[error("Stats configuration error: {0}")]
    Stats(String),
}

impl ConfigValidationError {
    pub fn config(details: impl Into<String>) -> Self {
        Self::Config(details.into())
    }

    pub fn backend(details: impl Into<String>) -> Self {
        Self::Backend(details.into())
    }

    pub fn http(details: impl Into<String>) -> Self {
        Self::Http(details.into())
    }

    pub fn logging(details: impl Into<String>) -> Self {
        Self::Logging(details.into())
    }

    pub fn stats(details: impl Into<String>) -> Self {
        Self::Stats(details.into())
    }
}
