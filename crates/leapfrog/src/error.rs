//! Unified error type for the Leapfrog server.

use leapfrog_protocol::ProtocolError;
use tokio_tungstenite::tungstenite;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LeapfrogError {
    /// Encoding or decoding a wire message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Binding or accepting on the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The websocket handshake or a frame send failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}
