use tokio::sync::watch;
use tracing::trace;

use super::{AggregateState, StatMessage, StatsSummary};

/// Sole writer of the [`AggregateState`].
///
/// Readers hold a [`watch::Receiver`] from [`Aggregator::subscribe`] and are
/// notified after every update. The state is mutated in place, so the
/// history is never copied on write.
#[derive(Debug)]
pub struct Aggregator {
    state: watch::Sender<AggregateState>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AggregateState::new());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<AggregateState> {
        self.state.subscribe()
    }

    pub fn apply(&self, message: &StatMessage) {
        self.state.send_modify(|state| state.apply(message));
        trace!("Applied stat message at {}", message.timestamp());
    }

    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|state| state.report_error(message));
    }

    pub fn summary(&self) -> StatsSummary {
        self.state.borrow().summary()
    }
}
