use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Connection refused: {0}")]
    Refused(String),

    #[error("Failed to connect to {url}: {details}")]
    Connect { url: String, details: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Socket is not connected")]
    NotConnected,
}

impl ConnectionError {
    pub fn refused(details: impl Into<String>) -> Self {
        ConnectionError::Refused(details.into())
    }

    pub fn connect(url: impl Into<String>, details: impl Into<String>) -> Self {
        ConnectionError::Connect {
            url: url.into(),
            details: details.into(),
        }
    }

    pub fn transport(details: impl Into<String>) -> Self {
        ConnectionError::Transport(details.into())
    }

    pub fn protocol(details: impl Into<String>) -> Self {
        ConnectionError::Protocol(details.into())
    }

    pub fn send(details: impl Into<String>) -> Self {
        ConnectionError::Send(details.into())
    }

    /// Refused connections are handled like an abnormal close.
    pub fn is_refused(&self) -> bool {
        matches!(self, ConnectionError::Refused(_))
    }

    /// Whether the transport that produced this error is unusable afterwards.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConnectionError::Refused(_)
                | ConnectionError::Connect { .. }
                | ConnectionError::Transport(_)
        )
    }
}
