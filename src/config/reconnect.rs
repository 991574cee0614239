use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigValidationError;

/// Reconnect policy for the stats socket. The delay is fixed and retries are
/// unbounded; only a normal closure stops the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Wait time before reopening a dropped connection
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.interval.is_zero() {
            return Err(ConfigValidationError::backend("reconnect interval cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_interval() {
        let config = Config {
            interval: Duration::ZERO,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::Backend(_))
        ));
        assert_eq!(Config::default().interval, Duration::from_millis(5000));
    }
}
