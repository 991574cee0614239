mod client;
mod events;
mod reconnect_strategy;
mod state;
mod transport;
mod websocket;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{SendOptions, SocketClient};
pub use events::{Payload, SocketEvent};
pub use reconnect_strategy::ReconnectStrategy;
pub use state::ConnectionState;
pub use transport::{CloseInfo, Connector, Frame, Transport, CLOSE_ABNORMAL, CLOSE_NORMAL};
pub use websocket::{WsConnector, WsTransport};
