//! The keyed store the engine talks to for per-actor flags.
//!
//! The engine only sees [`SessionStore`]. A single-instance deployment uses
//! [`MemorySessions`]; a horizontally scaled one would implement the trait
//! over a shared cache without touching the engine.

use std::future::Future;

use codehunt_protocol::{ActorId, PlayerId};
use tokio::sync::Mutex;

use crate::SessionManager;

/// Per-actor ephemeral state, keyed by actor.
pub trait SessionStore: Send + Sync + 'static {
    /// Arms the one-shot code entry (overwrites, never stacks).
    fn arm_code_entry(&self, actor: ActorId) -> impl Future<Output = ()> + Send;

    /// Consumes the code-entry flag; `true` if it was armed.
    fn take_code_entry(&self, actor: ActorId) -> impl Future<Output = bool> + Send;

    /// Replaces the pending kick selection.
    fn select_kick(&self, actor: ActorId, target: PlayerId) -> impl Future<Output = ()> + Send;

    /// Removes and returns the pending kick selection.
    fn take_kick(&self, actor: ActorId) -> impl Future<Output = Option<PlayerId>> + Send;
}

/// In-process [`SessionStore`].
#[derive(Default)]
pub struct MemorySessions {
    inner: Mutex<SessionManager>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actors with something armed.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl SessionStore for MemorySessions {
    async fn arm_code_entry(&self, actor: ActorId) {
        self.inner.lock().await.arm_code_entry(actor);
    }

    async fn take_code_entry(&self, actor: ActorId) -> bool {
        self.inner.lock().await.take_code_entry(actor)
    }

    async fn select_kick(&self, actor: ActorId, target: PlayerId) {
        let replaced = self.inner.lock().await.select_kick(actor, target);
        if let Some(previous) = replaced {
            tracing::debug!(%actor, %previous, %target, "kick selection replaced");
        }
    }

    async fn take_kick(&self, actor: ActorId) -> Option<PlayerId> {
        self.inner.lock().await.take_kick(actor)
    }
}
