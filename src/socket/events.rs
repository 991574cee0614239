use std::time::Duration;

use crate::ConnectionError;

/// Message body; the variant carries the frame kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Binary(data)
    }
}

impl From<&[u8]> for Payload {
    fn from(data: &[u8]) -> Self {
        Payload::Binary(data.to_vec())
    }
}

/// Everything the client reports to its owner, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// Transport established (initially or after a reconnect)
    Open { url: String },
    /// Message received; `sequence` starts at 1 and survives reconnects
    Message { payload: Payload, sequence: u64 },
    /// Non-terminal failure
    Error(ConnectionError),
    /// Abnormal closure, a reconnect is scheduled after `delay`
    Reconnecting {
        code: u16,
        reason: String,
        delay: Duration,
        attempt: u64,
    },
    /// Normal closure, the client will not reconnect
    Closed { code: u16, reason: String },
}
