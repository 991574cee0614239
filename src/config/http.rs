use serde::{Deserialize, Serialize};

use crate::ConfigValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Enable HTTP API
    pub enabled: bool,
    /// HTTP server address
    pub bind_addr: String,
    /// HTTP server port
    pub bind_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 9998,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.enabled {
            return Ok(());
        }

        if self.bind_addr.is_empty() {
            return Err(ConfigValidationError::http("bind address must not be empty"));
        }
        if self.bind_port == 0 {
            return Err(ConfigValidationError::http("port must be non-zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_port() {
        let config = Config {
            bind_port: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::Http(_))
        ));
    }

    #[test]
    fn test_disabled_skips_checks() {
        let config = Config {
            enabled: false,
            bind_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
