use std::collections::HashSet;

use serde::Serialize;

use super::{OutputStat, QueueDepthStat, StatMessage, StatsSummary};

/// Running totals over every stat message received.
///
/// Mutated only through [`AggregateState::apply`] and
/// [`AggregateState::report_error`], one call per inbound event, in arrival
/// order. Nothing is ever reset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateState {
    pub total_bytes: u64,
    pub total_events: u64,
    /// Number of distinct `Source` values seen
    pub total_sources: u64,
    pub events_per_sec: f64,
    pub bytes_per_sec: f64,
    pub current_generator_queue_depth: u64,
    pub current_output_queue_depth: u64,
    pub output_stats: Vec<OutputStat>,
    pub queue_depth_stats: Vec<QueueDepthStat>,
    pub total_output_stats_messages: u64,
    pub last_output_stats_timestamp: Option<f64>,
    pub last_queue_depth_stats_timestamp: Option<f64>,
    pub backend_error: bool,
    pub backend_error_msg: String,
    #[serde(skip)]
    seen_sources: HashSet<String>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: &StatMessage) {
        match message {
            StatMessage::Output(stat) => self.apply_output(stat),
            StatMessage::QueueDepth(stat) => self.apply_queue_depth(stat),
        }
    }

    /// Marks the backend as unreachable. Counters are left alone.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.backend_error = true;
        self.backend_error_msg = message.into();
    }

    pub fn has_seen_source(&self, source: &str) -> bool {
        self.seen_sources.contains(source)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }

    fn apply_output(&mut self, stat: &OutputStat) {
        self.total_output_stats_messages += 1;
        self.total_bytes = self.total_bytes.saturating_add(stat.bytes_written);
        self.total_events = self.total_events.saturating_add(stat.events_written);

        if !self.seen_sources.contains(&stat.source) {
            self.seen_sources.insert(stat.source.clone());
            self.total_sources += 1;
        }

        // The first report has no interval to divide by, so the raw counts
        // stand in for rates. An unchanged timestamp divides by zero.
        match self.last_output_stats_timestamp {
            None => {
                self.events_per_sec = stat.events_written as f64;
                self.bytes_per_sec = stat.bytes_written as f64;
            }
            Some(last) => {
                let elapsed = stat.timestamp - last;
                self.events_per_sec = stat.events_written as f64 / elapsed;
                self.bytes_per_sec = stat.bytes_written as f64 / elapsed;
            }
        }

        self.last_output_stats_timestamp = Some(stat.timestamp);
        self.output_stats.push(stat.clone());
        self.backend_error = false;
    }

    fn apply_queue_depth(&mut self, stat: &QueueDepthStat) {
        self.current_generator_queue_depth = stat.generator_queue_depth;
        self.current_output_queue_depth = stat.output_queue_depth;
        self.last_queue_depth_stats_timestamp = Some(stat.timestamp);
        self.queue_depth_stats.push(stat.clone());
        self.backend_error = false;
    }
}
