use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::MessageError;

const OUTPUT_TAG: &str = "EventsWritten";
const QUEUE_DEPTH_TAG: &str = "GeneratorQueueDepth";

/// Bytes and events written by one source since its previous report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputStat {
    pub events_written: u64,
    pub bytes_written: u64,
    pub source: String,
    /// Seconds
    pub timestamp: f64,
}

/// Instantaneous depth of the generator and output queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueDepthStat {
    pub generator_queue_depth: u64,
    pub output_queue_depth: u64,
    /// Seconds
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatMessage {
    Output(OutputStat),
    QueueDepth(QueueDepthStat),
}

impl StatMessage {
    /// Parses one JSON object and classifies it by its tag field:
    /// `EventsWritten` for output stats, `GeneratorQueueDepth` for queue
    /// depth stats. Objects carrying both or neither are rejected.
    pub fn parse(raw: &str) -> Result<Self, MessageError> {
        let fields: Map<String, Value> = serde_json::from_str(raw)?;

        match (fields.contains_key(OUTPUT_TAG), fields.contains_key(QUEUE_DEPTH_TAG)) {
            (true, true) => Err(MessageError::Ambiguous),
            (true, false) => Ok(StatMessage::Output(serde_json::from_value(Value::Object(
                fields,
            ))?)),
            (false, true) => Ok(StatMessage::QueueDepth(serde_json::from_value(
                Value::Object(fields),
            )?)),
            (false, false) => Err(MessageError::unknown_shape(
                fields.keys().map(String::as_str),
            )),
        }
    }

    /// Like [`StatMessage::parse`] for payloads that arrived as binary frames.
    pub fn parse_bytes(raw: &[u8]) -> Result<Self, MessageError> {
        let raw = std::str::from_utf8(raw).map_err(|_| MessageError::InvalidEncoding)?;
        Self::parse(raw)
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            StatMessage::Output(stat) => stat.timestamp,
            StatMessage::QueueDepth(stat) => stat.timestamp,
        }
    }
}

impl From<OutputStat> for StatMessage {
    fn from(stat: OutputStat) -> Self {
        StatMessage::Output(stat)
    }
}

impl From<QueueDepthStat> for StatMessage {
    fn from(stat: QueueDepthStat) -> Self {
        StatMessage::QueueDepth(stat)
    }
}
