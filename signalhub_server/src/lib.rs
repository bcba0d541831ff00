//! WebSocket signaling relay for WebRTC peer-to-peer bootstrapping.
//!
//! Clients that cannot address each other directly connect to a named room
//! and exchange opaque signaling payloads (SDP/ICE blobs) through this
//! server, which routes on metadata only and never inspects payloads.
//!
//! # Protocol
//!
//! Connect to `ws://host:port/{room}` — exactly one non-empty path segment;
//! anything else is rejected before the handshake. Frames are JSON objects
//! with a `type` discriminator (see [`signalhub_protocol`]):
//!
//! - send `{"type": "join"}` to become visible in the room; the reply
//!   carries your assigned id and the already-joined peers, and everyone
//!   else gets `{"type": "add", "id": ...}`
//! - send `{"type": "signal", "to": ..., "data": ...}` to relay a payload
//!   to a joined peer, delivered as `{"type": "signal", "from": ..., "data": ...}`
//! - on disconnect the remaining joined peers get `{"type": "remove", "id": ...}`
//!
//! Malformed frames, unknown types, and unaddressable signals are silently
//! dropped; the protocol has no error frames. Liveness is checked with
//! ping/pong probes every five seconds, and a client that misses a probe
//! window is forcibly disconnected.
//!
//! # Example
//!
//! ```bash
//! # Start the relay
//! signalhub-server
//!
//! # Then, from two browser tabs:
//! #   new WebSocket("ws://127.0.0.1:4000/lobby")
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod heartbeat;
pub mod relay;
pub mod server;
pub mod signaling;
pub mod state;

pub use config::ServerConfig;
pub use error::{ClientRequestError, SignalingError};
pub use server::SignalServer;
pub use state::{RoomId, ServerState};
