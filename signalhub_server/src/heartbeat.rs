//! Ping/pong liveness monitoring.
//!
//! Detects half-open connections that the transport cannot see (for
//! example a peer that vanished without a TCP FIN). A mute client is
//! terminated within roughly two probe intervals.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::connection::ClientConnection;

/// Why the heartbeat loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    /// The client did not pong between two consecutive probes.
    TimedOut,
    /// The connection closed through another path.
    Cancelled,
}

/// Probe `connection` every `interval` until it times out or the session
/// ends.
///
/// At each tick: if the alive flag is still clear from the previous probe
/// the connection is declared dead; otherwise the flag is cleared and a
/// ping is queued. A pong (handled by the receive loop) sets the flag
/// again.
pub async fn run(
    connection: Arc<ClientConnection>,
    interval: Duration,
    cancel: CancellationToken,
) -> HeartbeatOutcome {
    let mut ticker = time::interval(interval);
    // The first tick completes immediately; skip it so the client gets a
    // full interval to produce its first pong.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !connection.check_alive() {
                    return HeartbeatOutcome::TimedOut;
                }
                if !connection.ping() {
                    // Writer task is gone, the session is already tearing down.
                    return HeartbeatOutcome::Cancelled;
                }
            }
            () = cancel.cancelled() => return HeartbeatOutcome::Cancelled,
        }
    }
}
