//! The session manager: per-actor flags in a plain map.
//!
//! `SessionManager` is NOT thread-safe by itself. It is a plain `HashMap`;
//! [`MemorySessions`](crate::MemorySessions) wraps it in a mutex for
//! concurrent use.
//!
//! Idle entries are removed as soon as their last flag is consumed, so the
//! map only ever holds actors with something armed.

use std::collections::HashMap;

use codehunt_protocol::{ActorId, PlayerId};

use crate::ActorSession;

/// Per-actor ephemeral state. Actors with nothing armed have no entry.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<ActorId, ActorSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the one-shot code entry for `actor`.
    pub fn arm_code_entry(&mut self, actor: ActorId) {
        self.sessions.entry(actor).or_default().awaiting_code = true;
        tracing::debug!(%actor, "code entry armed");
    }

    /// Consumes the code-entry flag. Returns whether it was armed.
    pub fn take_code_entry(&mut self, actor: ActorId) -> bool {
        let Some(session) = self.sessions.get_mut(&actor) else {
            return false;
        };
        let armed = std::mem::take(&mut session.awaiting_code);
        self.prune(actor);
        armed
    }

    /// Records `target` as the pending kick, returning any selection it replaced.
    pub fn select_kick(&mut self, actor: ActorId, target: PlayerId) -> Option<PlayerId> {
        self.sessions
            .entry(actor)
            .or_default()
            .pending_kick
            .replace(target)
    }

    /// Removes and returns the pending kick selection.
    pub fn take_kick(&mut self, actor: ActorId) -> Option<PlayerId> {
        let target = self.sessions.get_mut(&actor)?.pending_kick.take();
        self.prune(actor);
        target
    }

    pub fn get(&self, actor: &ActorId) -> Option<&ActorSession> {
        self.sessions.get(actor)
    }

    /// Number of actors with something armed.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn prune(&mut self, actor: ActorId) {
        if self.sessions.get(&actor).is_some_and(ActorSession::is_idle) {
            self.sessions.remove(&actor);
        }
    }
}
