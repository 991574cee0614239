use std::{future::Future, sync::Arc};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{interval, timeout, Duration, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    http_api::{start_http_server, ApiState},
    socket::Connector,
    stats::AggregateState,
    StatsBackend, StatsError,
};

/// Runs the stats backend together with the HTTP API and summary logger.
pub struct StatsApp {
    config: Config,
    shutdown: watch::Sender<bool>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl StatsApp {
    pub fn new(config: Config) -> Result<Self, StatsError> {
        // Validate the config first
        config.validate()?;

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            config,
            shutdown,
            tasks: Arc::new(Mutex::new(Vec::new())),
        })
    }

    async fn spawn_task<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(future);
        debug!("Spawned {} task: {:?}", name, task.id());

        self.tasks.lock().await.push(task);
    }

    /// Starts every task and waits until [`StatsApp::shutdown`] is called.
    pub async fn run<C: Connector>(self: Arc<Self>, connector: C) -> Result<(), StatsError> {
        let backend = StatsBackend::open(connector, &self.config.backend);
        let stats_rx = backend.subscribe();
        let connection_rx = backend.connection_state();

        self.spawn_task("backend", backend.run(self.shutdown.subscribe()))
            .await;

        if self.config.http.enabled {
            let state = ApiState {
                stats: stats_rx.clone(),
                connection: connection_rx,
            };
            let http = self.config.http.clone();
            let shutdown_rx = self.shutdown.subscribe();

            self.spawn_task("http", async move {
                if let Err(e) =
                    start_http_server(http.bind_addr, http.bind_port, state, shutdown_rx).await
                {
                    error!("HTTP server error: {}", e);
                }
            })
            .await;
        }

        // Periodically log statistics
        let summary_interval = self.config.stats.summary_interval;
        let mut shutdown_rx = self.shutdown.subscribe();

        self.spawn_task("summary", async move {
            let mut ticker = interval(summary_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => log_summary(&stats_rx),
                    _ = shutdown_rx.changed() => {
                        debug!("Summary task received shutdown signal");
                        break;
                    }
                }
            }
        })
        .await;

        let mut shutdown_rx = self.shutdown.subscribe();
        if !*shutdown_rx.borrow_and_update() {
            let _ = shutdown_rx.changed().await;
        }

        info!("Main loop received shutdown signal");
        Ok(())
    }

    /// Graceful shutdown
    pub async fn shutdown(&self) -> Result<(), StatsError> {
        info!("Initiating graceful shutdown");
        let timeout_duration = Duration::from_secs(5);

        self.shutdown.send_replace(true);

        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        info!("Waiting for {} tasks to complete", tasks.len());

        for task in tasks {
            match timeout(timeout_duration, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Task failed during shutdown: {}", e),
                Err(_) => warn!("Task did not finish within {:?}", timeout_duration),
            }
        }

        info!("Shutdown complete");
        Ok(())
    }
}

fn log_summary(stats_rx: &watch::Receiver<AggregateState>) {
    let summary = stats_rx.borrow().summary();

    if summary.backend_error {
        warn!("Backend unreachable: {}", summary.backend_error_msg);
    }

    info!(
        total_events = summary.total_events,
        total_bytes = summary.total_bytes,
        total_sources = summary.total_sources,
        events_per_sec = summary.events_per_sec,
        bytes_per_sec = summary.bytes_per_sec,
        generator_queue = summary.current_generator_queue_depth,
        output_queue = summary.current_output_queue_depth,
        "Stats summary"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HttpConfig, socket::testing::MockConnector};

    fn config() -> Config {
        Config {
            http: HttpConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_shutdown() {
        let connector = MockConnector::new();
        let mut session = connector.push_session();

        let app = Arc::new(StatsApp::new(config()).unwrap());
        let handle = tokio::spawn(Arc::clone(&app).run(connector.clone()));

        session.text(r#"{"EventsWritten":1,"BytesWritten":1,"Source":"a","Timestamp":1}"#);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!handle.is_finished());

        app.shutdown().await.unwrap();
        handle.await.unwrap().unwrap();

        // The backend closed the socket on its way out
        assert!(matches!(
            session.sent().await,
            Some(crate::socket::Frame::Close(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config();
        config.backend.url = String::new();
        assert!(StatsApp::new(config).is_err());
    }
}
