//! Authentication hook for gateway clients.
//!
//! Codehunt doesn't own identities: the chat platform does. A client that
//! connects to the gateway claims an [`ActorId`] and proves it is allowed to
//! speak for chat participants by presenting the transport credential.
//!
//! [`Authenticator`] is the seam; [`SharedSecretAuth`] is the stock
//! implementation that compares the presented token with the configured
//! credential. Tests and alternative deployments can plug in their own.

use std::future::Future;

use codehunt_protocol::ActorId;

use crate::SessionError;

/// Validates a gateway handshake and returns the actor it speaks for.
///
/// # Example
///
/// ```rust
/// use codehunt_protocol::ActorId;
/// use codehunt_session::{Authenticator, SessionError};
///
/// /// Lets anybody in. Development only.
/// struct OpenDoor;
///
/// impl Authenticator for OpenDoor {
///     async fn authenticate(
///         &self,
///         _token: &str,
///         actor: ActorId,
///     ) -> Result<ActorId, SessionError> {
///         Ok(actor)
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Checks `token` for a client claiming to be `actor`.
    ///
    /// # Returns
    /// - `Ok(ActorId)`: the actor the connection is bound to
    /// - `Err(SessionError::AuthFailed)`: wrong or missing credential
    fn authenticate(
        &self,
        token: &str,
        actor: ActorId,
    ) -> impl Future<Output = Result<ActorId, SessionError>> + Send;
}

/// Accepts a handshake when its token equals the transport credential.
#[derive(Clone)]
pub struct SharedSecretAuth {
    secret: String,
}

impl SharedSecretAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

// Keep the credential out of logs.
impl std::fmt::Debug for SharedSecretAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretAuth").finish_non_exhaustive()
    }
}

impl Authenticator for SharedSecretAuth {
    async fn authenticate(&self, token: &str, actor: ActorId) -> Result<ActorId, SessionError> {
        if actor.0 == 0 {
            return Err(SessionError::ActorRejected(actor));
        }
        if !constant_time_eq(token.as_bytes(), self.secret.as_bytes()) {
            tracing::debug!(%actor, "handshake token rejected");
            return Err(SessionError::AuthFailed("invalid transport credential".into()));
        }
        Ok(actor)
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
