//! Error types for the session layer.

use leapfrog_protocol::SessionCode;

/// Errors that can occur when addressing a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No session with this code, or it has been purged.
    #[error("session {0} not found")]
    NotFound(SessionCode),

    /// A session with this code is already running.
    #[error("session {0} already exists")]
    AlreadyExists(SessionCode),

    /// The session's actor has stopped and no longer takes events.
    #[error("session {0} is unavailable")]
    Unavailable(SessionCode),
}

impl RoomError {
    /// Stable snake_case reason code for client-facing rejections.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Unavailable(_) => "unavailable",
        }
    }
}
