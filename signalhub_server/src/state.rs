//! Room registry and membership state.
//!
//! Rooms are created lazily on first connection and never deleted; their
//! lifetime is the process lifetime. Each room tracks two collections:
//!
//! - `clients`: every open connection, keyed by peer id
//! - `joined`: the subset of ids that have completed the `join` handshake
//!
//! All mutation happens under a single registry lock, so id allocation is an
//! atomic check-and-insert and every broadcast works from a point-in-time
//! snapshot of the joined set.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message;
use parking_lot::Mutex;
use signalhub_protocol::PeerId;
use tokio::sync::mpsc;

use crate::connection::ClientConnection;

/// Room identifier: the single non-empty path segment of the WebSocket URL.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
struct Room {
    clients: HashMap<PeerId, Arc<ClientConnection>>,
    joined: HashSet<PeerId>,
}

/// Point-in-time view of a room taken while processing a `join`.
pub struct JoinSnapshot {
    /// Joined peers at the moment of the join, excluding the joiner.
    pub peer_ids: Vec<PeerId>,
    /// Connections to notify with an `add`, excluding the joiner (by id).
    pub targets: Vec<Arc<ClientConnection>>,
}

/// Process-wide signaling state: the map from room id to room.
#[derive(Default, Clone)]
pub struct ServerState {
    rooms: Arc<Mutex<HashMap<RoomId, Room>>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection in `room`, creating the room if this is
    /// the first connection to it.
    ///
    /// Allocates a peer id, regenerating on collision with a live
    /// connection. The check and the insert happen under one lock
    /// acquisition, so concurrent connects cannot share an id.
    pub fn connect(&self, room: &RoomId, tx: mpsc::UnboundedSender<Message>) -> Arc<ClientConnection> {
        let mut rooms = self.rooms.lock();
        let room = rooms.entry(room.clone()).or_default();
        let mut id = PeerId::random();
        while room.clients.contains_key(&id) {
            id = PeerId::random();
        }
        let connection = Arc::new(ClientConnection::new(id, tx));
        room.clients.insert(id, connection.clone());
        connection
    }

    /// Record `id` as joined and snapshot the room for the join broadcast.
    ///
    /// Re-joining is an idempotent set add, but a fresh snapshot is still
    /// returned so the caller re-runs the full reply + `add` sequence.
    pub fn join(&self, room: &RoomId, id: PeerId) -> JoinSnapshot {
        let mut rooms = self.rooms.lock();
        let Some(room) = rooms.get_mut(room) else {
            return JoinSnapshot {
                peer_ids: Vec::new(),
                targets: Vec::new(),
            };
        };
        room.joined.insert(id);
        let peer_ids: Vec<PeerId> = room.joined.iter().copied().filter(|p| *p != id).collect();
        let targets = peer_ids
            .iter()
            .filter_map(|p| room.clients.get(p).cloned())
            .collect();
        JoinSnapshot { peer_ids, targets }
    }

    /// Resolve the relay target for a `signal` addressed to `to`.
    ///
    /// `Some` only if `to` is currently joined in `room`; connected but
    /// unjoined peers are not addressable.
    pub fn signal_target(&self, room: &RoomId, to: PeerId) -> Option<Arc<ClientConnection>> {
        let rooms = self.rooms.lock();
        let room = rooms.get(room)?;
        if room.joined.contains(&to) {
            room.clients.get(&to).cloned()
        } else {
            None
        }
    }

    /// Remove `id` from the room's membership and connection maps.
    ///
    /// Returns the remaining joined connections, to be notified with a
    /// `remove`. The broadcast happens even if `id` never joined; clients
    /// treat a `remove` for an unknown id as a no-op. The room itself stays
    /// registered even when empty.
    pub fn disconnect(&self, room: &RoomId, id: PeerId) -> Vec<Arc<ClientConnection>> {
        let mut rooms = self.rooms.lock();
        let Some(room) = rooms.get_mut(room) else {
            return Vec::new();
        };
        room.joined.remove(&id);
        room.clients.remove(&id);
        room.joined
            .iter()
            .filter_map(|p| room.clients.get(p).cloned())
            .collect()
    }

    /// Number of rooms ever created.
    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Open connections across all rooms.
    pub fn connection_count(&self) -> usize {
        self.rooms.lock().values().map(|r| r.clients.len()).sum()
    }

    /// Currently-joined ids in `room`, unordered.
    pub fn joined_ids(&self, room: &RoomId) -> Vec<PeerId> {
        self.rooms
            .lock()
            .get(room)
            .map(|r| r.joined.iter().copied().collect())
            .unwrap_or_default()
    }
}
