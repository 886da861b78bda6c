//! Transport layer for Codehunt.
//!
//! Two seams live here:
//!
//! - [`Notifier`]: the chat transport as the game engine sees it: "send
//!   this notice to that actor". The engine uses it both to reply to the
//!   acting player and to push notices to somebody else (the opponent who
//!   was just discovered, the player who was just kicked).
//! - [`Transport`] / [`Connection`]: byte-level connections for the
//!   WebSocket gateway that stands in for a chat platform.
//!
//! [`Outbox`] connects the two: gateway connections register themselves
//! per actor, and the engine's notices are routed to whichever connection
//! the actor currently has open.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod outbox;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use outbox::Outbox;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::future::Future;

use codehunt_protocol::{ActorId, Notice};

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Delivers notices to actors.
///
/// This is the only thing the game engine knows about the chat platform.
/// A production deployment implements it against the platform's send-message
/// API; tests implement it with a recorder; the gateway uses [`Outbox`].
///
/// The returned future must be `Send`: engine operations run inside
/// spawned Tokio tasks.
pub trait Notifier: Send + Sync + 'static {
    /// Sends `notice` to `actor`.
    ///
    /// # Errors
    /// [`TransportError::Unreachable`] when the actor can't be reached,
    /// or whatever the underlying delivery reports.
    fn notify(
        &self,
        actor: ActorId,
        notice: Notice,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// Sending and receiving are independent: a task may block in `recv` while
/// another task sends on the same connection.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }
}
