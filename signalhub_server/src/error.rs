//! Error types for the signaling relay.

use thiserror::Error;

/// Errors surfaced by server setup and shutdown.
#[derive(Error, Debug)]
pub enum SignalingError {
    /// I/O error while binding or serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Classification of a single inbound frame.
///
/// None of these reach the client; the protocol defines no error frames.
/// `Close` ends the session through the cleanup path, everything else is
/// logged and discarded.
#[derive(Error, Debug)]
pub enum ClientRequestError {
    /// The client sent a close frame.
    #[error("connection closed")]
    Close,

    /// Text frame that does not parse as a protocol request.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame kind the protocol has no use for (binary).
    #[error("unsupported message type")]
    UnsupportedType,

    /// Transport-level failure reading the frame.
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl From<axum::Error> for ClientRequestError {
    fn from(e: axum::Error) -> Self {
        Self::WebSocket(e.to_string())
    }
}
