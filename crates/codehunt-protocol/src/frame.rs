//! Outbound notices and the gateway wire format.
//!
//! [`Notice`] is what the engine sends to an actor: a line of text plus
//! optional buttons. [`Envelope`] and [`Frame`] are how the WebSocket
//! gateway carries notices and intents over the wire.

use serde::{Deserialize, Serialize};

use crate::{ActorId, Intent, PlayerId, Profile, CANCEL_KICK, CONFIRM_KICK, KICK_PREFIX};

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A selectable option attached to a notice.
///
/// Tapping it sends back an [`Intent::Button`] with the same `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }

    /// A kick-target button: `kick:<id>`.
    pub fn kick(label: impl Into<String>, target: PlayerId) -> Self {
        Self::new(label, format!("{KICK_PREFIX}{}", target.0))
    }

    pub fn confirm_kick() -> Self {
        Self::new("Yes", CONFIRM_KICK)
    }

    pub fn cancel_kick() -> Self {
        Self::new("No", CANCEL_KICK)
    }
}

/// A message for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Button>,
}

impl Notice {
    /// A plain text notice with no buttons.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// A notice with selectable options.
    pub fn with_options(text: impl Into<String>, options: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame: what travels over the gateway
// ---------------------------------------------------------------------------

/// Everything the gateway and its clients say to each other.
///
/// Internally tagged: `{ "type": "Heartbeat", "client_time": 5 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Frame {
    /// Client → Server, first frame on every connection.
    /// `token` must equal the transport credential; `actor_id` is who the
    /// client speaks for. `profile` fills in display hints for `/start`.
    Handshake {
        version: u32,
        token: String,
        actor_id: ActorId,
        #[serde(default)]
        profile: Profile,
    },

    /// Server → Client: the handshake was accepted.
    HandshakeAck { actor_id: ActorId, server_time: u64 },

    /// Client → Server: an intent from the actor.
    Intent { intent: Intent },

    /// Server → Client: a notice for the actor.
    Notice { notice: Notice },

    /// Client → Server keep-alive.
    Heartbeat { client_time: u64 },

    /// Server → Client keep-alive reply.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Either direction: closing the connection.
    Disconnect { reason: String },

    /// Server → Client: the previous frame was rejected.
    /// HTTP-style codes: 400 bad request, 401 unauthorized.
    Error { code: u16, message: String },
}

/// The top-level wire wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-direction sequence number.
    pub seq: u64,
    /// Milliseconds since the sender's connection started.
    pub timestamp: u64,
    pub frame: Frame,
}

impl Envelope {
    pub fn new(seq: u64, timestamp: u64, frame: Frame) -> Self {
        Self {
            seq,
            timestamp,
            frame,
        }
    }
}
