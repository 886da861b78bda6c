//! Error types for the session layer.

use codehunt_protocol::ActorId;

/// Errors that can occur in the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The transport credential in the handshake was missing or wrong.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The actor id is not acceptable (e.g. the reserved id 0).
    #[error("actor {0} is not allowed")]
    ActorRejected(ActorId),
}
