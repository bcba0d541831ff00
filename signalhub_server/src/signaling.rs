//! The per-message protocol state machine.
//!
//! Messages are handled one at a time in arrival order per connection.
//! Anything that is not a well-formed, addressable request is silently
//! discarded; the protocol defines no error frames, so a client's only
//! symptom of a rejected request is the absence of a reply.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::ws::Message;
use signalhub_protocol::{ClientRequest, ServerEvent};
use tracing::{debug, warn};

use crate::connection::ClientConnection;
use crate::error::ClientRequestError;
use crate::relay;
use crate::state::{RoomId, ServerState};

/// Classify an inbound frame as a protocol request.
///
/// Ping/pong frames are liveness traffic and are handled by the receive
/// loop before this point.
pub fn parse_frame(message: &Message) -> Result<ClientRequest, ClientRequestError> {
    match message {
        Message::Text(text) => Ok(ClientRequest::from_str(text.as_str())?),
        Message::Close(_) => Err(ClientRequestError::Close),
        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {
            Err(ClientRequestError::UnsupportedType)
        }
    }
}

/// Advance the state machine for one request from `connection`.
pub fn handle_request(
    request: ClientRequest,
    connection: &Arc<ClientConnection>,
    room: &RoomId,
    state: &ServerState,
) {
    match request {
        ClientRequest::Join => {
            // A repeated join re-runs the whole sequence: the set add is
            // idempotent, but the sender gets a fresh peer list and the
            // room gets another `add`, which lets a client re-sync.
            let snapshot = state.join(room, connection.id);
            debug!(peer_id = %connection.id, room = %room, peers = snapshot.peer_ids.len(), "peer joined");
            let reply = ServerEvent::Join {
                id: connection.id,
                peer_ids: snapshot.peer_ids,
            };
            if !connection.send_event(&reply) {
                warn!(peer_id = %connection.id, "failed to queue join reply");
            }
            relay::fan_out(&snapshot.targets, &ServerEvent::Add { id: connection.id });
        }
        ClientRequest::Signal { to, data } => match state.signal_target(room, to) {
            Some(target) => {
                debug!(from = %connection.id, %to, len = data.len(), "relaying signal");
                let event = ServerEvent::Signal {
                    from: connection.id,
                    data,
                };
                if !target.send_event(&event) {
                    warn!(%to, "failed to queue relayed signal");
                }
            }
            None => {
                debug!(from = %connection.id, %to, "dropping signal to unknown or unjoined peer");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalhub_protocol::PeerId;
    use tokio::sync::mpsc;

    fn lobby() -> RoomId {
        RoomId("lobby".into())
    }

    fn connect(state: &ServerState) -> (Arc<ClientConnection>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (state.connect(&lobby(), tx), rx)
    }

    fn recv_json(rx: &mut mpsc::UnboundedReceiver<Message>) -> serde_json::Value {
        let Ok(Message::Text(text)) = rx.try_recv() else {
            panic!("expected a queued text frame");
        };
        serde_json::from_str(text.as_str()).unwrap()
    }

    #[test]
    fn parse_frame_accepts_join() {
        let frame = Message::Text(r#"{"type":"join"}"#.into());
        assert_eq!(parse_frame(&frame).unwrap(), ClientRequest::Join);
    }

    #[test]
    fn parse_frame_rejects_garbage_and_binary() {
        let garbage = Message::Text("not json".into());
        assert!(matches!(
            parse_frame(&garbage),
            Err(ClientRequestError::Json(_))
        ));
        let binary = Message::Binary(vec![1, 2, 3].into());
        assert!(matches!(
            parse_frame(&binary),
            Err(ClientRequestError::UnsupportedType)
        ));
        let close = Message::Close(None);
        assert!(matches!(parse_frame(&close), Err(ClientRequestError::Close)));
    }

    #[tokio::test]
    async fn join_replies_and_notifies() {
        let state = ServerState::new();
        let (a, mut rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);

        handle_request(ClientRequest::Join, &a, &lobby(), &state);
        let reply = recv_json(&mut rx_a);
        assert_eq!(reply["type"], "join");
        assert_eq!(reply["id"], a.id.to_string());
        assert_eq!(reply["peerIds"], serde_json::json!([]));

        handle_request(ClientRequest::Join, &b, &lobby(), &state);
        let reply = recv_json(&mut rx_b);
        assert_eq!(reply["peerIds"], serde_json::json!([a.id.to_string()]));
        let add = recv_json(&mut rx_a);
        assert_eq!(add["type"], "add");
        assert_eq!(add["id"], b.id.to_string());
    }

    #[tokio::test]
    async fn duplicate_join_rebroadcasts() {
        let state = ServerState::new();
        let (a, mut rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);
        handle_request(ClientRequest::Join, &a, &lobby(), &state);
        handle_request(ClientRequest::Join, &b, &lobby(), &state);
        let _ = rx_a.try_recv(); // join reply
        let _ = rx_a.try_recv(); // add for b
        let _ = rx_b.try_recv(); // join reply

        handle_request(ClientRequest::Join, &a, &lobby(), &state);
        let reply = recv_json(&mut rx_a);
        assert_eq!(reply["type"], "join");
        assert_eq!(reply["peerIds"], serde_json::json!([b.id.to_string()]));
        let add = recv_json(&mut rx_b);
        assert_eq!(add["type"], "add");
        assert_eq!(add["id"], a.id.to_string());
    }

    #[tokio::test]
    async fn signal_is_relayed_with_from() {
        let state = ServerState::new();
        let (a, _rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);
        handle_request(ClientRequest::Join, &a, &lobby(), &state);
        handle_request(ClientRequest::Join, &b, &lobby(), &state);
        let _ = rx_b.try_recv(); // join reply

        handle_request(
            ClientRequest::Signal {
                to: b.id,
                data: "offer-sdp".into(),
            },
            &a,
            &lobby(),
            &state,
        );
        let relayed = recv_json(&mut rx_b);
        assert_eq!(relayed["type"], "signal");
        assert_eq!(relayed["from"], a.id.to_string());
        assert_eq!(relayed["data"], "offer-sdp");
    }

    #[tokio::test]
    async fn signal_to_unjoined_or_unknown_is_dropped() {
        let state = ServerState::new();
        let (a, _rx_a) = connect(&state);
        let (b, mut rx_b) = connect(&state);
        handle_request(ClientRequest::Join, &a, &lobby(), &state);
        // b is connected but has not joined; it is not addressable.
        handle_request(
            ClientRequest::Signal {
                to: b.id,
                data: "x".into(),
            },
            &a,
            &lobby(),
            &state,
        );
        assert!(rx_b.try_recv().is_err());

        handle_request(
            ClientRequest::Signal {
                to: PeerId::random(),
                data: "x".into(),
            },
            &a,
            &lobby(),
            &state,
        );
        assert!(rx_b.try_recv().is_err());
    }
}
