//! Wire-level vocabulary for Codehunt.
//!
//! - **Identities** ([`ActorId`], [`PlayerId`], [`Profile`]): who is acting
//!   and which stored player is meant.
//! - **Intents** ([`Intent`], [`Action`]): what the chat transport delivers
//!   and what the engine acts on.
//! - **Notices** ([`Notice`], [`Button`]): what the engine says back.
//! - **Frames** ([`Envelope`], [`Frame`]): the gateway's wire format.
//! - **Codec** ([`Codec`], [`JsonCodec`]): frames to bytes and back.
//!
//! ```text
//! Transport (bytes) → Protocol (Frame / Intent) → Engine (Action)
//! ```

mod codec;
mod error;
mod frame;
mod intent;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use frame::{Button, Envelope, Frame, Notice};
pub use intent::{Action, Intent, CANCEL_KICK, CONFIRM_KICK, KICK_PREFIX, MENU_KEYWORD};
pub use types::{ActorId, PlayerId, Profile};
