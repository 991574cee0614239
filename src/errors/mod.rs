mod config;
mod connection;
mod init;
mod message;
mod stats;

pub use config::ConfigValidationError;
pub use connection::ConnectionError;
pub use init::InitializationError;
pub use message::MessageError;
pub use stats::StatsError;
