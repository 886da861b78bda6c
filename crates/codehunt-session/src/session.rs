//! Per-actor ephemeral state.

use codehunt_protocol::PlayerId;

/// What one actor has armed between two intents.
///
/// Both fields hold at most one value. A new `/code` re-arms the flag, a
/// new kick selection replaces the old target: nothing stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorSession {
    /// Set by `/code`; the next text message from this actor is consumed
    /// as a code attempt, whatever it says.
    pub awaiting_code: bool,

    /// Set by a `kick:<id>` tap, consumed by `confirm_kick`, dropped by
    /// `cancel_kick`.
    pub pending_kick: Option<PlayerId>,
}

impl ActorSession {
    /// `true` when nothing is armed, so the entry can be dropped.
    pub fn is_idle(&self) -> bool {
        !self.awaiting_code && self.pending_kick.is_none()
    }
}
