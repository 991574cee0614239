use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tokio::{sync::mpsc, time::Instant};

use crate::ConnectionError;

use super::{CloseInfo, Connector, Frame, Transport};

type Incoming = Result<Frame, ConnectionError>;

/// Hands out scripted sessions in order, then never completes.
#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    sessions: Arc<Mutex<VecDeque<Result<MockTransport, ConnectionError>>>>,
    attempts: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_session(&self) -> MockSession {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        self.sessions.lock().unwrap().push_back(Ok(MockTransport {
            incoming: incoming_rx,
            outgoing: outgoing_tx,
        }));

        MockSession {
            incoming: incoming_tx,
            outgoing: outgoing_rx,
        }
    }

    pub(crate) fn push_failure(&self, error: ConnectionError) {
        self.sessions.lock().unwrap().push_back(Err(error));
    }

    /// URL and time of every connect call so far.
    pub(crate) fn attempts(&self) -> Vec<(String, Instant)> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, url: &str) -> Result<MockTransport, ConnectionError> {
        self.attempts
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        let next = self.sessions.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

pub(crate) struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Incoming>,
    outgoing: mpsc::UnboundedSender<Frame>,
}

impl Transport for MockTransport {
    async fn recv(&mut self) -> Option<Incoming> {
        self.incoming.recv().await
    }

    async fn send(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        self.outgoing
            .send(frame)
            .map_err(|_| ConnectionError::send("peer is gone"))
    }
}

/// Server side of a scripted session. Dropping it ends the stream without
/// a close frame.
pub(crate) struct MockSession {
    incoming: mpsc::UnboundedSender<Incoming>,
    outgoing: mpsc::UnboundedReceiver<Frame>,
}

impl MockSession {
    pub(crate) fn push(&self, item: Incoming) {
        let _ = self.incoming.send(item);
    }

    pub(crate) fn text(&self, body: &str) {
        self.push(Ok(Frame::Text(body.to_string())));
    }

    pub(crate) fn close(&self, code: u16, reason: &str) {
        self.push(Ok(Frame::Close(Some(CloseInfo::new(code, reason)))));
    }

    pub(crate) async fn sent(&mut self) -> Option<Frame> {
        self.outgoing.recv().await
    }

    pub(crate) fn try_sent(&mut self) -> Option<Frame> {
        self.outgoing.try_recv().ok()
    }

    /// Stops accepting frames from the client; later sends fail.
    pub(crate) fn close_outgoing(&mut self) {
        self.outgoing.close();
    }
}
