//! Wire protocol for the signalhub signaling relay.
//!
//! Messages are JSON objects exchanged as text frames over a WebSocket,
//! discriminated by a `type` field:
//!
//! Client → server:
//! - `{"type": "join"}` - request to join the room
//! - `{"type": "signal", "to": "<peer-id>", "data": "<opaque>"}` - relay a
//!   payload to a joined peer
//!
//! Server → client:
//! - `{"type": "join", "id": "<peer-id>", "peerIds": [...]}` - join reply
//!   with the assigned id and the already-joined peers (excluding self)
//! - `{"type": "add", "id": "<peer-id>"}` - a new peer joined
//! - `{"type": "signal", "from": "<peer-id>", "data": "<opaque>"}` - relayed
//!   payload, `from` is the original sender
//! - `{"type": "remove", "id": "<peer-id>"}` - a peer disconnected
//!
//! The relay never interprets `data`; it is an opaque string (SDP, ICE, or
//! anything else two peers agree on).

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A peer's identity within a room.
///
/// Random, assigned by the server on connect, unique within the room at
/// allocation time. Rooms are independent identifier spaces; two rooms may
/// each contain a peer with the same id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub Uuid);

impl PeerId {
    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for PeerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for PeerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Requests a client may send to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientRequest {
    /// Declare membership in the room.
    Join,
    /// Relay `data` to the joined peer identified by `to`.
    Signal { to: PeerId, data: String },
}

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Reply to a `join`: the sender's assigned id and the ids of every
    /// other currently-joined peer in the room.
    Join {
        id: PeerId,
        #[serde(rename = "peerIds")]
        peer_ids: Vec<PeerId>,
    },
    /// A new peer completed the join handshake.
    Add { id: PeerId },
    /// A relayed payload from another joined peer.
    Signal { from: PeerId, data: String },
    /// A peer disconnected.
    Remove { id: PeerId },
}

#[cfg(feature = "json")]
impl FromStr for ClientRequest {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[cfg(feature = "json")]
impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
