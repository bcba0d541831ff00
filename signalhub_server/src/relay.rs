//! Event fan-out to room peers.

use std::sync::Arc;

use signalhub_protocol::ServerEvent;
use tracing::warn;

use crate::connection::ClientConnection;

/// Send `event` to every connection in `targets`.
///
/// Serializes once, then queues per target. Failures are logged and
/// skipped; there is no retry or delivery confirmation at this layer.
pub fn fan_out(targets: &[Arc<ClientConnection>], event: &ServerEvent) {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to serialize event for fan-out");
            return;
        }
    };
    for connection in targets {
        if !connection.send(text.clone()) {
            warn!(peer_id = %connection.id, "failed to queue event for peer");
        }
    }
}
