use std::time::Duration;

use crate::config::ReconnectConfig;

/// Fixed-interval reconnect schedule with no retry limit.
pub struct ReconnectStrategy {
    config: ReconnectConfig,
    current_attempt: u64,
}

impl ReconnectStrategy {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            current_attempt: 0,
        }
    }

    /// Delay before the next attempt, together with its 1-based number.
    pub fn next_delay(&mut self) -> (Duration, u64) {
        self.current_attempt += 1;
        (self.config.interval, self.current_attempt)
    }

    /// Called once a connection is established.
    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }
}
