//! Per-client connection state.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::ws::Message;
use signalhub_protocol::{PeerId, ServerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// One connected client: its assigned id, the send channel to its WebSocket
/// writer task, the heartbeat liveness flag, and the token that cancels the
/// session when the connection closes through any path.
pub struct ClientConnection {
    /// Peer id, unique within the room at allocation time.
    pub id: PeerId,
    tx: mpsc::UnboundedSender<Message>,
    is_alive: AtomicBool,
    cancel: CancellationToken,
}

impl ClientConnection {
    pub fn new(id: PeerId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            tx,
            is_alive: AtomicBool::new(true),
            cancel: CancellationToken::new(),
        }
    }

    /// Queue a text frame for the client. Best-effort: returns `false` if
    /// the writer task is gone; nothing is retried.
    pub fn send(&self, text: String) -> bool {
        self.tx.send(Message::Text(text.into())).is_ok()
    }

    /// Serialize a protocol event and queue it for the client.
    pub fn send_event(&self, event: &ServerEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(text) => self.send(text),
            Err(_) => false,
        }
    }

    /// Queue a ping probe.
    pub fn ping(&self) -> bool {
        self.tx.send(Message::Ping(vec![].into())).is_ok()
    }

    /// Mark the connection alive (pong received).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
    }

    /// Check and clear the alive flag.
    ///
    /// Returns `true` if the client responded since the last probe.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Signal that this connection is closed. Cancels the receive loop and
    /// the heartbeat; safe to call from any path, repeatedly.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the connection has been terminated.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Token tied to this connection's closed state.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
