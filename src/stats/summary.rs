use serde::Serialize;

use super::AggregateState;

/// Counters of an [`AggregateState`] without the message history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_bytes: u64,
    pub total_events: u64,
    pub total_sources: u64,
    pub events_per_sec: f64,
    pub bytes_per_sec: f64,
    pub current_generator_queue_depth: u64,
    pub current_output_queue_depth: u64,
    pub total_output_stats_messages: u64,
    pub total_queue_depth_stats_messages: u64,
    pub last_output_stats_timestamp: Option<f64>,
    pub last_queue_depth_stats_timestamp: Option<f64>,
    pub backend_error: bool,
    pub backend_error_msg: String,
}

impl From<&AggregateState> for StatsSummary {
    fn from(state: &AggregateState) -> Self {
        Self {
            total_bytes: state.total_bytes,
            total_events: state.total_events,
            total_sources: state.total_sources,
            events_per_sec: state.events_per_sec,
            bytes_per_sec: state.bytes_per_sec,
            current_generator_queue_depth: state.current_generator_queue_depth,
            current_output_queue_depth: state.current_output_queue_depth,
            total_output_stats_messages: state.total_output_stats_messages,
            total_queue_depth_stats_messages: state.queue_depth_stats.len() as u64,
            last_output_stats_timestamp: state.last_output_stats_timestamp,
            last_queue_depth_stats_timestamp: state.last_queue_depth_stats_timestamp,
            backend_error: state.backend_error,
            backend_error_msg: state.backend_error_msg.clone(),
        }
    }
}
