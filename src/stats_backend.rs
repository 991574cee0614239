use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    config::BackendConfig,
    socket::{ConnectionState, Connector, Payload, SocketClient, SocketEvent},
    stats::{AggregateState, Aggregator, StatMessage},
    MessageError,
};

/// Feeds messages from the stats socket into the [`Aggregator`].
pub struct StatsBackend {
    client: SocketClient,
    events: mpsc::Receiver<SocketEvent>,
    aggregator: Aggregator,
    url: String,
}

impl StatsBackend {
    /// Creates the socket client and starts connecting to `config.url`.
    pub fn open<C: Connector>(connector: C, config: &BackendConfig) -> Self {
        let (client, events) =
            SocketClient::new(connector, config.reconnect.clone(), config.event_buffer);
        client.open(config.url.clone());

        info!("Stats backend opened for {}", config.url);

        Self {
            client,
            events,
            aggregator: Aggregator::new(),
            url: config.url.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AggregateState> {
        self.aggregator.subscribe()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.client.watch_state()
    }

    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                shutdown = shutdown_rx.changed() => {
                    match shutdown {
                        Ok(_) => info!("Stats backend shutting down"),
                        Err(e) => warn!("Shutdown channel closed: {}", e),
                    }
                    break;
                }

                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("Socket event channel closed");
                        break;
                    }
                },
            }
        }

        self.client.close();
        // Ensure already delivered events are processed before exiting
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }

        // Anything emitted after this point is discarded
        let Self { client, events, .. } = self;
        drop(events);
        client.join().await;

        info!("Stats backend shutdown complete");
    }

    fn handle_event(&self, event: SocketEvent) {
        match event {
            SocketEvent::Open { url } => {
                info!("Connected to stats endpoint {}", url);
            }

            SocketEvent::Message { payload, sequence } => {
                let parsed = match &payload {
                    Payload::Text(text) => StatMessage::parse(text),
                    Payload::Binary(data) => StatMessage::parse_bytes(data),
                };

                match parsed {
                    Ok(message) => self.aggregator.apply(&message),
                    Err(e) => self.drop_message(sequence, e),
                }
            }

            SocketEvent::Error(e) => {
                warn!("Stats endpoint error: {}", e);
                self.report_unreachable();
            }

            SocketEvent::Reconnecting {
                code,
                reason,
                delay,
                attempt,
            } => {
                warn!(
                    "Stats endpoint disconnected (code {}: {}), reconnect attempt {} in {:?}",
                    code, reason, attempt, delay
                );
                self.report_unreachable();
            }

            SocketEvent::Closed { code, reason } => {
                info!("Stats endpoint closed (code {}: {})", code, reason);
            }
        }
    }

    fn drop_message(&self, sequence: u64, error: MessageError) {
        warn!("Dropping stats message #{}: {}", sequence, error);
    }

    fn report_unreachable(&self) {
        self.aggregator.report_error(format!(
            "Error communicating with the backend at {}",
            self.url
        ));
    }
}
