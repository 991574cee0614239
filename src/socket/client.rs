use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, info, trace, warn};

use crate::{config::ReconnectConfig, ConnectionError};

use super::{
    CloseInfo, ConnectionState, Connector, Frame, Payload, ReconnectStrategy, SocketEvent,
    Transport, CLOSE_NORMAL,
};

/// Close code reported for a close frame without a status.
const CLOSE_NO_STATUS: u16 = 1005;

#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    /// Send as a binary frame instead of text
    pub binary: bool,
}

#[derive(Debug)]
enum Command {
    Open(String),
    Send(Frame),
    Close,
}

/// Handle to a reconnecting WebSocket client.
///
/// The transport is owned by a worker task; this handle only forwards
/// commands to it. Connection failures never surface as return values,
/// they are reported as [`SocketEvent`]s on the receiver returned by
/// [`SocketClient::new`]. Dropping every handle shuts the worker down.
pub struct SocketClient {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl SocketClient {
    /// Spawns the worker task. Must be called from within a Tokio runtime.
    pub fn new<C: Connector>(
        connector: C,
        config: ReconnectConfig,
        event_buffer: usize,
    ) -> (Self, mpsc::Receiver<SocketEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(event_buffer.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Closed);

        let worker = Worker {
            connector,
            strategy: ReconnectStrategy::new(config),
            commands: command_rx,
            events: event_tx,
            state: state_tx,
            sequence: 0,
        };

        let task = tokio::spawn(worker.run());
        debug!("Spawned socket worker: {:?}", task.id());

        let client = Self {
            commands: command_tx,
            state: state_rx,
            task,
        };

        (client, event_rx)
    }

    /// Starts a fresh connection attempt to `url`, abandoning any current
    /// transport or pending reconnect.
    pub fn open(&self, url: impl Into<String>) {
        self.command(Command::Open(url.into()));
    }

    /// Sends `data` over the current transport. Binary payloads always go
    /// out as binary frames; `options.binary` also sends text as binary.
    /// Failures, including sending while disconnected, are reported as
    /// [`SocketEvent::Error`].
    pub fn send(&self, data: impl Into<Payload>, options: SendOptions) {
        let frame = match data.into() {
            Payload::Text(text) if options.binary => Frame::Binary(text.into_bytes()),
            Payload::Text(text) => Frame::Text(text),
            Payload::Binary(data) => Frame::Binary(data),
        };

        self.command(Command::Send(frame));
    }

    /// Closes the connection normally. The client stops reconnecting.
    pub fn close(&self) {
        self.command(Command::Close);
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Stops the worker and waits for it to exit.
    pub async fn join(self) {
        let Self { commands, task, .. } = self;
        drop(commands);

        if let Err(e) = task.await {
            warn!("Socket worker terminated abnormally: {}", e);
        }
    }

    fn command(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            debug!("Socket worker is gone, dropping {:?}", e.0);
        }
    }
}

enum Phase<T> {
    Closed,
    Connecting(String),
    Open { url: String, transport: T },
    Reconnecting { url: String, delay: Duration },
    Shutdown,
}

/// Commands that end a non-open phase early.
enum Interrupt {
    Open(String),
    Close,
    Shutdown,
}

struct Worker<C: Connector> {
    connector: C,
    strategy: ReconnectStrategy,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<SocketEvent>,
    state: watch::Sender<ConnectionState>,
    /// Received message counter, kept across reconnects
    sequence: u64,
}

impl<C: Connector> Worker<C> {
    async fn run(mut self) {
        let mut phase = Phase::Closed;

        loop {
            phase = match phase {
                Phase::Closed => self.closed().await,
                Phase::Connecting(url) => self.connecting(url).await,
                Phase::Open { url, transport } => self.open(url, transport).await,
                Phase::Reconnecting { url, delay } => self.reconnecting(url, delay).await,
                Phase::Shutdown => break,
            };
        }

        self.transition(ConnectionState::Closed);
        debug!("Socket worker exited");
    }

    async fn closed(&mut self) -> Phase<C::Transport> {
        loop {
            let command = self.commands.recv().await;
            match command {
                Some(Command::Close) => {}
                other => {
                    if let Some(interrupt) = self.idle_command(other).await {
                        return self.interrupt(interrupt).await;
                    }
                }
            }
        }
    }

    async fn connecting(&mut self, url: String) -> Phase<C::Transport> {
        self.transition(ConnectionState::Connecting);
        debug!("Opening {}", url);

        let outcome = {
            let connect = self.connector.connect(&url);
            tokio::pin!(connect);

            loop {
                tokio::select! {
                    result = &mut connect => break Ok(result),
                    command = self.commands.recv() => {
                        if let Some(interrupt) = self.idle_command(command).await {
                            break Err(interrupt);
                        }
                    }
                }
            }
        };

        match outcome {
            Ok(Ok(transport)) => {
                info!("Connected to {}", url);
                self.strategy.reset();
                self.transition(ConnectionState::Open);
                self.emit(SocketEvent::Open { url: url.clone() }).await;
                Phase::Open { url, transport }
            }
            Ok(Err(e)) => {
                if !e.is_refused() {
                    warn!("Failed to connect to {}: {}", url, e);
                    self.emit(SocketEvent::Error(e.clone())).await;
                }
                self.schedule_reconnect(url, CloseInfo::abnormal(e.to_string()))
                    .await
            }
            Err(interrupt) => self.interrupt(interrupt).await,
        }
    }

    async fn open(&mut self, url: String, mut transport: C::Transport) -> Phase<C::Transport> {
        loop {
            tokio::select! {
                frame = transport.recv() => match frame {
                    Some(Ok(Frame::Text(text))) => self.deliver(Payload::Text(text)).await,
                    Some(Ok(Frame::Binary(data))) => self.deliver(Payload::Binary(data)).await,
                    Some(Ok(Frame::Close(info))) => {
                        let info = info.unwrap_or_else(|| CloseInfo::new(CLOSE_NO_STATUS, ""));
                        if info.is_normal() {
                            info!("Connection to {} closed normally", url);
                            self.transition(ConnectionState::Closed);
                            self.emit(SocketEvent::Closed {
                                code: info.code,
                                reason: info.reason,
                            })
                            .await;
                            return Phase::Closed;
                        }
                        return self.schedule_reconnect(url, info).await;
                    }
                    Some(Err(e)) if e.is_refused() => {
                        return self
                            .schedule_reconnect(url, CloseInfo::abnormal(e.to_string()))
                            .await;
                    }
                    Some(Err(e)) if e.is_fatal() => {
                        warn!("Transport to {} failed: {}", url, e);
                        self.emit(SocketEvent::Error(e.clone())).await;
                        return self
                            .schedule_reconnect(url, CloseInfo::abnormal(e.to_string()))
                            .await;
                    }
                    Some(Err(e)) => {
                        warn!("Error on connection to {}: {}", url, e);
                        self.emit(SocketEvent::Error(e)).await;
                    }
                    None => {
                        return self
                            .schedule_reconnect(url, CloseInfo::abnormal("connection dropped"))
                            .await;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(frame)) => {
                        if let Err(e) = transport.send(frame).await {
                            warn!("Failed to send to {}: {}", url, e);
                            self.emit(SocketEvent::Error(e)).await;
                        }
                    }
                    Some(Command::Open(next)) => {
                        debug!("Abandoning transport to {} for {}", url, next);
                        return Phase::Connecting(next);
                    }
                    Some(Command::Close) => {
                        Self::close_transport(&mut transport, &url).await;
                        self.transition(ConnectionState::Closed);
                        self.emit(SocketEvent::Closed {
                            code: CLOSE_NORMAL,
                            reason: String::new(),
                        })
                        .await;
                        return Phase::Closed;
                    }
                    None => {
                        Self::close_transport(&mut transport, &url).await;
                        return Phase::Shutdown;
                    }
                },
            }
        }
    }

    async fn reconnecting(&mut self, url: String, delay: Duration) -> Phase<C::Transport> {
        let timer = sleep(delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => {
                    debug!("Reconnecting to {}", url);
                    return Phase::Connecting(url);
                }
                command = self.commands.recv() => {
                    if let Some(interrupt) = self.idle_command(command).await {
                        return self.interrupt(interrupt).await;
                    }
                }
            }
        }
    }

    async fn schedule_reconnect(&mut self, url: String, close: CloseInfo) -> Phase<C::Transport> {
        let (delay, attempt) = self.strategy.next_delay();
        info!(
            "Connection to {} lost (code {}: {}), retrying in {:?} (attempt {})",
            url, close.code, close.reason, delay, attempt
        );

        self.transition(ConnectionState::Reconnecting);
        self.emit(SocketEvent::Reconnecting {
            code: close.code,
            reason: close.reason,
            delay,
            attempt,
        })
        .await;

        Phase::Reconnecting { url, delay }
    }

    /// Handles a command received while no transport is open. Sends are
    /// rejected, never queued.
    async fn idle_command(&self, command: Option<Command>) -> Option<Interrupt> {
        match command {
            Some(Command::Open(url)) => Some(Interrupt::Open(url)),
            Some(Command::Send(_)) => {
                debug!("Send while {}", *self.state.borrow());
                self.emit(SocketEvent::Error(ConnectionError::NotConnected))
                    .await;
                None
            }
            Some(Command::Close) => Some(Interrupt::Close),
            None => Some(Interrupt::Shutdown),
        }
    }

    async fn interrupt(&mut self, interrupt: Interrupt) -> Phase<C::Transport> {
        match interrupt {
            Interrupt::Open(url) => Phase::Connecting(url),
            Interrupt::Close => {
                info!("Socket closed by client");
                self.transition(ConnectionState::Closed);
                self.emit(SocketEvent::Closed {
                    code: CLOSE_NORMAL,
                    reason: String::new(),
                })
                .await;
                Phase::Closed
            }
            Interrupt::Shutdown => Phase::Shutdown,
        }
    }

    async fn close_transport(transport: &mut C::Transport, url: &str) {
        if let Err(e) = transport.send(Frame::Close(Some(CloseInfo::normal()))).await {
            debug!("Failed to send close frame to {}: {}", url, e);
        }
    }

    async fn deliver(&mut self, payload: Payload) {
        self.sequence += 1;
        trace!("Message #{} received", self.sequence);

        self.emit(SocketEvent::Message {
            payload,
            sequence: self.sequence,
        })
        .await;
    }

    async fn emit(&self, event: SocketEvent) {
        if self.events.send(event).await.is_err() {
            trace!("Socket event receiver dropped");
        }
    }

    fn transition(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!("Socket state {} -> {}", previous, state);
        }
    }
}
