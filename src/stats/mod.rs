mod aggregator;
mod message;
mod state;
mod summary;

pub use aggregator::Aggregator;
pub use message::{OutputStat, QueueDepthStat, StatMessage};
pub use state::AggregateState;
pub use summary::StatsSummary;
