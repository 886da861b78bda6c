use codehunt_protocol::ActorId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// No live route to the actor: never connected, disconnected, or the
    /// connection's outbound queue is gone.
    #[error("actor {0} is unreachable")]
    Unreachable(ActorId),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
