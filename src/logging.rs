use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::{config::LoggingConfig, InitializationError, StatsError};

/// Installs the global subscriber. The returned guard flushes the log file
/// writer and must be kept alive for the lifetime of the process.
pub fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, StatsError> {
    // Validate logging config before proceeding
    config.validate()?;

    let timer = OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        time::format_description::well_known::Rfc3339,
    );

    let console = if config.is_json() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_thread_ids(config.thread_ids)
            .with_thread_names(config.thread_names)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_timer(timer.clone())
            .with_filter(env_filter(config))
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.thread_ids)
            .with_thread_names(config.thread_names)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_level(true)
            .with_timer(timer.clone())
            .with_filter(env_filter(config))
            .boxed()
    };

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "gogen-stats.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(timer)
                .with_filter(env_filter(config))
                .boxed();

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| {
            InitializationError::logging(format!("Failed to initialize logging: {}", e))
        })?;

    Ok(guard)
}

/// `RUST_LOG` directives take precedence over the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.get_level_filter().into())
        .from_env_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            setup_logging(&config),
            Err(StatsError::Config(_))
        ));
    }
}
