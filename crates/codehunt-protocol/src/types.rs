//! Identity types shared by every layer of Codehunt.
//!
//! Two identities travel through the system and they must never be mixed up:
//!
//! - [`ActorId`] is the chat participant's external identity, assigned by
//!   the chat platform. Every inbound intent carries one.
//! - [`PlayerId`] is the id of a stored player record, assigned by the store.
//!   Kick buttons embed it, and the discovery relation is expressed in it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The external identity of a chat participant.
///
/// Newtype over `u64` so an actor id can't be passed where a player record
/// id is expected. `#[serde(transparent)]` keeps it a bare number on the
/// wire: `ActorId(42)` serializes as `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// The id of a stored player record.
///
/// Ordered so "first match" has a stable meaning: when two alive players
/// share a secret code, the lower id wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Parses the numeric form embedded in button payloads (`kick:17`).
///
/// The `P-` display prefix is accepted too, so ids copied out of logs work.
impl FromStr for PlayerId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw.strip_prefix("P-").unwrap_or(raw);
        digits
            .parse::<u64>()
            .map(PlayerId)
            .map_err(|_| ProtocolError::InvalidMessage(format!("invalid player id: {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Display hints the chat platform sends along with an entry.
///
/// Display-only and non-authoritative: the store keeps whatever profile it
/// saw first and never overwrites it from later hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Profile {
    /// `@username`, falling back to `@first_name`, then `@user`.
    pub fn display_name(&self) -> String {
        let name = self
            .username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.first_name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("user");
        format!("@{name}")
    }
}
