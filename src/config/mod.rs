mod app;
mod backend;
mod http;
mod logging;
mod reconnect;
mod stats;

pub use app::Config;
pub use backend::Config as BackendConfig;
pub use http::Config as HttpConfig;
pub use logging::Config as LoggingConfig;
pub use reconnect::Config as ReconnectConfig;
pub use stats::Config as StatsConfig;
