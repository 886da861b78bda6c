//! Inbound intents and the actions they parse into.
//!
//! The chat transport delivers four kinds of input: the actor opened the
//! bot (entry), sent free text, sent a named command, or tapped a button.
//! [`Intent`] is that raw shape. [`Action`] is what the game engine acts
//! on, produced by [`Action::parse`].

use serde::{Deserialize, Serialize};

use crate::{PlayerId, Profile, ProtocolError};

/// Button payload prefix for selecting a kick target: `kick:<player id>`.
pub const KICK_PREFIX: &str = "kick:";
/// Button payload confirming the pending kick.
pub const CONFIRM_KICK: &str = "confirm_kick";
/// Button payload cancelling the pending kick.
pub const CANCEL_KICK: &str = "cancel_kick";

/// Text that re-opens the game menu when no code entry is pending.
pub const MENU_KEYWORD: &str = "start";

/// Raw input from the chat transport.
///
/// `#[serde(tag = "kind")]` keeps the JSON flat:
/// `{ "kind": "Command", "name": "code" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Intent {
    /// The actor opened the bot. Carries display hints for registration.
    Entry {
        #[serde(default)]
        profile: Profile,
    },

    /// A free-text message.
    Text { text: String },

    /// A named command such as `code` or `/start_game`.
    Command { name: String },

    /// A button tap. `data` is the payload the button was created with.
    Button { data: String },
}

/// A parsed intent, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `/start` or an entry: register if needed and report where the actor stands.
    Enter(Profile),
    /// `/code`: arm the one-shot code entry.
    BeginCode,
    /// Any text message. Consumed as a code attempt if one is armed.
    Text(String),
    /// `/list`: show discovered opponents who are still alive.
    ListOpponents,
    /// `kick:<id>` button: remember the target and ask for confirmation.
    RequestKick(PlayerId),
    /// `confirm_kick` button.
    ConfirmKick,
    /// `cancel_kick` button.
    CancelKick,
    /// `/start_game` (admin).
    StartGame,
    /// `/end_game` (admin).
    EndGame,
    /// `/reset_game` (admin).
    ResetGame,
    /// `/players` (admin).
    ListPlayers,
}

impl Action {
    /// Parses a transport intent.
    ///
    /// Commands are matched without a leading `/` and without a
    /// `@botname` suffix, so `/code@codehunt_bot` is `code`.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] for unknown commands, unknown
    /// buttons, and kick buttons whose id doesn't parse.
    pub fn parse(intent: Intent) -> Result<Self, ProtocolError> {
        match intent {
            Intent::Entry { profile } => Ok(Self::Enter(profile)),
            Intent::Text { text } => Ok(Self::Text(text)),
            Intent::Command { name } => Self::parse_command(&name),
            Intent::Button { data } => Self::parse_button(&data),
        }
    }

    fn parse_command(name: &str) -> Result<Self, ProtocolError> {
        let name = name.trim().trim_start_matches('/');
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Ok(Self::Enter(Profile::default())),
            "code" => Ok(Self::BeginCode),
            "list" => Ok(Self::ListOpponents),
            "start_game" => Ok(Self::StartGame),
            "end_game" => Ok(Self::EndGame),
            "reset_game" => Ok(Self::ResetGame),
            "players" => Ok(Self::ListPlayers),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown command: {other:?}"
            ))),
        }
    }

    fn parse_button(data: &str) -> Result<Self, ProtocolError> {
        if let Some(id) = data.strip_prefix(KICK_PREFIX) {
            return Ok(Self::RequestKick(id.parse()?));
        }
        match data {
            CONFIRM_KICK => Ok(Self::ConfirmKick),
            CANCEL_KICK => Ok(Self::CancelKick),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown button: {other:?}"
            ))),
        }
    }

    /// Short name for structured logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enter(_) => "enter",
            Self::BeginCode => "begin_code",
            Self::Text(_) => "text",
            Self::ListOpponents => "list_opponents",
            Self::RequestKick(_) => "request_kick",
            Self::ConfirmKick => "confirm_kick",
            Self::CancelKick => "cancel_kick",
            Self::StartGame => "start_game",
            Self::EndGame => "end_game",
            Self::ResetGame => "reset_game",
            Self::ListPlayers => "list_players",
        }
    }
}
