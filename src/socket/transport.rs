use std::future::Future;

use crate::ConnectionError;

/// Close code for a normal closure. Anything else is abnormal.
pub const CLOSE_NORMAL: u16 = 1000;
/// Close code used when the transport went away without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Close(Option<CloseInfo>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn normal() -> Self {
        Self::new(CLOSE_NORMAL, "")
    }

    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(CLOSE_ABNORMAL, reason)
    }

    pub fn is_normal(&self) -> bool {
        self.code == CLOSE_NORMAL
    }
}

/// A live, exclusively owned link to the stats endpoint.
///
/// `recv` must be cancel safe: the client polls it alongside its command
/// channel and drops the future whenever a command wins.
pub trait Transport: Send + 'static {
    /// Next inbound frame, `None` once the stream has ended.
    fn recv(&mut self) -> impl Future<Output = Option<Result<Frame, ConnectionError>>> + Send;

    fn send(&mut self, frame: Frame) -> impl Future<Output = Result<(), ConnectionError>> + Send;
}

/// Opens transports. A fresh transport is requested on every (re)connect.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Transport, ConnectionError>> + Send;
}
