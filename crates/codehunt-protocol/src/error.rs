//! Error types for the protocol layer.
//!
//! Each crate in Codehunt defines its own error enum, so a `ProtocolError`
//! always means the problem is in parsing or (de)serialization, never in
//! storage or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The input decoded fine but isn't something we understand: an
    /// unknown command, a button payload with a bad player id, a
    /// handshake that arrives out of order.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
