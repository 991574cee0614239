pub mod app;
pub mod config;
pub mod errors;
pub mod http_api;
pub mod logging;
pub mod socket;
pub mod stats;
pub mod stats_backend;

pub use app::StatsApp;
pub use config::{BackendConfig, Config, HttpConfig, LoggingConfig, ReconnectConfig};
pub use errors::{
    ConfigValidationError, ConnectionError, InitializationError, MessageError, StatsError,
};
pub use http_api::start_http_server;
pub use logging::setup_logging;
pub use socket::{
    ConnectionState, Connector, SendOptions, SocketClient, SocketEvent, Transport, WsConnector,
};
pub use stats::{AggregateState, Aggregator, OutputStat, QueueDepthStat, StatMessage, StatsSummary};
pub use stats_backend::StatsBackend;
