use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How often a summary of the aggregate is logged
    #[serde(with = "humantime_serde")]
    pub summary_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            summary_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.summary_interval.is_zero() {
            return Err(ConfigValidationError::stats("summary_interval cannot be 0"));
        }

        Ok(())
    }
}
