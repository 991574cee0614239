use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, trace};

use crate::ConnectionError;

use super::{CloseInfo, Connector, Frame, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &str) -> Result<WsTransport, ConnectionError> {
        debug!("Connecting to {}", url);

        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| connect_error(url, e))?;

        Ok(WsTransport { stream })
    }
}

pub struct WsTransport {
    stream: WsStream,
}

impl Transport for WsTransport {
    async fn recv(&mut self) -> Option<Result<Frame, ConnectionError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(ConnectionError::from(e))),
            };

            match message {
                Message::Text(text) => return Some(Ok(Frame::Text(text.to_string()))),
                Message::Binary(data) => return Some(Ok(Frame::Binary(data.to_vec()))),
                Message::Close(frame) => {
                    // Write out the queued close reply before the stream is dropped
                    if let Err(e) = self.stream.flush().await {
                        debug!("Close reply not flushed: {}", e);
                    }

                    return Some(Ok(Frame::Close(frame.map(|frame| {
                        CloseInfo::new(u16::from(frame.code), String::from(&*frame.reason))
                    }))));
                }
                // Ping/Pong are answered by tungstenite
                other => trace!("Ignoring control frame: {:?}", other),
            }
        }
    }

    async fn send(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
            Frame::Close(info) => Message::Close(info.map(|info| CloseFrame {
                code: CloseCode::from(info.code),
                reason: info.reason.into(),
            })),
        };

        self.stream
            .send(message)
            .await
            .map_err(|e| ConnectionError::send(e.to_string()))
    }
}

fn connect_error(url: &str, err: WsError) -> ConnectionError {
    match err {
        WsError::Io(ref io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
            ConnectionError::refused(format!("{}: {}", url, io))
        }
        other => ConnectionError::connect(url, other.to_string()),
    }
}

impl From<WsError> for ConnectionError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::Io(ref io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
                ConnectionError::refused(io.to_string())
            }
            WsError::Capacity(e) => ConnectionError::protocol(e.to_string()),
            other => ConnectionError::transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_classified() {
        // Bind and drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("ws://{}/statsws", addr);
        let err = WsConnector::new().connect(&url).await.err().unwrap();
        assert!(err.is_refused(), "unexpected error: {:?}", err);
    }

    #[test]
    fn test_capacity_error_is_not_fatal() {
        let err = ConnectionError::from(WsError::Capacity(
            tokio_tungstenite::tungstenite::error::CapacityError::MessageTooLong {
                size: 10,
                max_size: 5,
            },
        ));
        assert!(!err.is_fatal());
    }
}
