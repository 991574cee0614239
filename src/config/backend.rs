use serde::{Deserialize, Serialize};

use crate::ConfigValidationError;

use super::ReconnectConfig;

/// Stats endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// WebSocket URL of the stats endpoint
    pub url: String,
    /// Capacity of the socket event channel
    pub event_buffer: usize,
    /// Reconnect policy
    pub reconnect: ReconnectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "ws://localhost:9999/statsws".to_string(),
            event_buffer: 1024,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.url.is_empty() {
            return Err(ConfigValidationError::backend("url must not be empty"));
        }

        // TLS support is not compiled in
        if !self.url.starts_with("ws://") {
            return Err(ConfigValidationError::backend(format!(
                "url must use the ws:// scheme, got {}",
                self.url
            )));
        }

        if self.event_buffer == 0 {
            return Err(ConfigValidationError::backend("event_buffer cannot be 0"));
        }

        self.reconnect.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_http_scheme() {
        let config = Config {
            url: "http://localhost:9999/statsws".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::Backend(_))
        ));
    }

    #[test]
    fn test_rejects_tls_scheme() {
        let config = Config {
            url: "wss://stats.example.com/statsws".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_buffer() {
        let config = Config {
            event_buffer: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
