//! Routes notices to the connection each actor currently has open.

use std::collections::HashMap;
use std::sync::Arc;

use codehunt_protocol::{ActorId, Notice};
use tokio::sync::{mpsc, RwLock};

use crate::{ConnectionId, Notifier, TransportError};

/// One actor's live delivery route.
struct Route {
    conn_id: ConnectionId,
    sender: mpsc::UnboundedSender<Notice>,
}

/// Registry of live actor connections, usable as a [`Notifier`].
///
/// A connection handler calls [`register`](Self::register) after the
/// handshake and drains the returned receiver into its socket. An actor has
/// at most one route: registering again replaces the old one, and the old
/// connection's receiver sees its channel close.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct Outbox {
    routes: Arc<RwLock<HashMap<ActorId, Route>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or replaces) the route for `actor` and returns the receiving end.
    pub async fn register(
        &self,
        actor: ActorId,
        conn_id: ConnectionId,
    ) -> mpsc::UnboundedReceiver<Notice> {
        let (tx, rx) = mpsc::unbounded_channel();
        let previous = self
            .routes
            .write()
            .await
            .insert(actor, Route { conn_id, sender: tx });
        if let Some(old) = previous {
            tracing::info!(%actor, old = %old.conn_id, new = %conn_id, "route replaced");
        }
        rx
    }

    /// Removes the route for `actor`, but only if it still belongs to
    /// `conn_id`. A connection that was replaced must not tear down its
    /// successor's route on the way out.
    pub async fn unregister(&self, actor: ActorId, conn_id: ConnectionId) {
        let mut routes = self.routes.write().await;
        if routes.get(&actor).is_some_and(|r| r.conn_id == conn_id) {
            routes.remove(&actor);
            tracing::debug!(%actor, %conn_id, "route removed");
        }
    }

    /// Returns `true` if `actor` has a live route.
    pub async fn is_connected(&self, actor: ActorId) -> bool {
        self.routes.read().await.contains_key(&actor)
    }

    /// Number of live routes.
    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.routes.read().await.is_empty()
    }
}

impl Notifier for Outbox {
    async fn notify(&self, actor: ActorId, notice: Notice) -> Result<(), TransportError> {
        let delivered = {
            let routes = self.routes.read().await;
            let route = routes.get(&actor).ok_or(TransportError::Unreachable(actor))?;
            route.sender.send(notice).is_ok()
        };
        if delivered {
            return Ok(());
        }

        // The receiver is gone but the handler hasn't unregistered yet.
        let mut routes = self.routes.write().await;
        if routes.get(&actor).is_some_and(|r| r.sender.is_closed()) {
            routes.remove(&actor);
        }
        Err(TransportError::Unreachable(actor))
    }
}
