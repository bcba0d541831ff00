//! WebSocket session lifecycle, from upgrade through disconnect.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use signalhub_protocol::ServerEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ClientRequestError;
use crate::heartbeat::{self, HeartbeatOutcome};
use crate::relay;
use crate::server::AppState;
use crate::signaling;
use crate::state::RoomId;

/// `GET /{room}` — upgrade to a signaling session.
///
/// The route only matches a single non-empty path segment, so empty and
/// multi-segment paths are rejected with a 404 before any handshake.
pub async fn ws_handler(
    Path(room): Path<String>,
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.max_message_size(app.config.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, RoomId(room), app))
}

/// Run one client's session.
///
/// The socket is split: a writer task drains the connection's outbound
/// queue, a heartbeat task probes liveness, and this function consumes
/// inbound frames until the client closes, the transport fails, or the
/// heartbeat terminates the connection. Cleanup then removes the peer from
/// the room and tells the remaining joined peers.
async fn handle_socket(socket: WebSocket, room: RoomId, app: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
    let connection = app.state.connect(&room, out_tx);
    let peer_id = connection.id;
    info!(%peer_id, %room, "client connected");

    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    let monitor = tokio::spawn({
        let connection = connection.clone();
        let cancel = connection.cancel_token();
        let interval = app.config.heartbeat_interval;
        async move {
            if heartbeat::run(connection.clone(), interval, cancel).await
                == HeartbeatOutcome::TimedOut
            {
                warn!(peer_id = %connection.id, "missed liveness probe, terminating");
                connection.terminate();
            }
        }
    });

    // Forced termination skips any frames still queued for the writer;
    // a graceful close lets them drain.
    let mut forced = false;
    loop {
        tokio::select! {
            () = connection.closed() => {
                forced = true;
                break;
            }
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(message)) => {
                        if matches!(message, Message::Ping(_) | Message::Pong(_)) {
                            connection.mark_alive();
                            continue;
                        }
                        match signaling::parse_frame(&message) {
                            Ok(request) => {
                                signaling::handle_request(request, &connection, &room, &app.state);
                            }
                            Err(ClientRequestError::Close) => break,
                            Err(e) => debug!(%peer_id, error = %e, "discarding frame"),
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%peer_id, error = %ClientRequestError::from(e), "transport error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if forced {
        writer.abort();
    }
    connection.terminate();
    let remaining = app.state.disconnect(&room, peer_id);
    relay::fan_out(&remaining, &ServerEvent::Remove { id: peer_id });
    let _ = monitor.await;
    info!(%peer_id, %room, forced, "client disconnected");
}
