//! Unified error type for Codehunt.

use codehunt_engine::EngineError;
use codehunt_protocol::ProtocolError;
use codehunt_session::SessionError;
use codehunt_store::StoreError;
use codehunt_transport::TransportError;

use crate::SettingsError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CodehuntError {
    /// Connection, send, recv, or delivery trouble.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame that couldn't be encoded, decoded, or made sense of.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Handshake authentication failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Storage failed outside of an engine operation (e.g. opening a snapshot).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A game operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Startup configuration is missing or malformed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
