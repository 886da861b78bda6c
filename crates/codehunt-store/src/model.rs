//! Durable records: the game singleton and the players.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use codehunt_protocol::{ActorId, PlayerId, Profile};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of the game.
///
/// ```text
/// Waiting --start--> Running --end--> Ended
///    ^                                  |
///    +------------- reset --------------+   (reset is legal from any state)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Waiting,
    Running,
    Ended,
}

impl GameStatus {
    /// Returns `true` while players may discover and kick.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (_, Self::Waiting) => true,
            (Self::Waiting, Self::Running) => true,
            (Self::Running, Self::Ended) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Running => write!(f, "running"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// The single shared game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub status: GameStatus,
    /// Actors allowed to run lifecycle commands.
    pub admin_ids: BTreeSet<ActorId>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Game {
    /// A fresh game in `Waiting`.
    pub fn new(admin_ids: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            status: GameStatus::Waiting,
            admin_ids: admin_ids.into_iter().collect(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn is_admin(&self, actor: ActorId) -> bool {
        self.admin_ids.contains(&actor)
    }

    /// Applies `patch`, leaving unset fields alone.
    pub fn apply(&mut self, patch: &GamePatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(at) = patch.started_at {
            self.started_at = Some(at);
        }
        if let Some(at) = patch.ended_at {
            self.ended_at = Some(at);
        }
    }
}

/// Fields to change on the game record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePatch {
    pub status: Option<GameStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl GamePatch {
    pub fn start(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(GameStatus::Running),
            started_at: Some(at),
            ..Self::default()
        }
    }

    pub fn end(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(GameStatus::Ended),
            ended_at: Some(at),
            ..Self::default()
        }
    }

    pub fn reset() -> Self {
        Self {
            status: Some(GameStatus::Waiting),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A stored participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub actor_id: ActorId,
    #[serde(default)]
    pub profile: Profile,
    /// Secret code. Never changes after creation, not even on reset.
    pub code: String,
    pub alive: bool,
    /// Players this one has discovered or been discovered by.
    #[serde(default)]
    pub discovered: BTreeSet<PlayerId>,
    #[serde(default)]
    pub kicked_by: Option<PlayerId>,
}

impl Player {
    pub fn display_name(&self) -> String {
        self.profile.display_name()
    }

    pub fn has_discovered(&self, other: PlayerId) -> bool {
        self.discovered.contains(&other)
    }

    /// Applies `patch`, leaving unset fields alone.
    pub fn apply(&mut self, patch: &PlayerPatch) {
        if let Some(alive) = patch.alive {
            self.alive = alive;
        }
        if let Some(kicked_by) = patch.kicked_by {
            self.kicked_by = kicked_by;
        }
        if patch.clear_discovered {
            self.discovered.clear();
        }
    }
}

/// What registration hands to [`Store::create_player`](crate::Store::create_player).
/// The store assigns the id; new players start alive with nothing discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub actor_id: ActorId,
    pub profile: Profile,
    pub code: String,
}

impl NewPlayer {
    pub fn into_player(self, id: PlayerId) -> Player {
        Player {
            id,
            actor_id: self.actor_id,
            profile: self.profile,
            code: self.code,
            alive: true,
            discovered: BTreeSet::new(),
            kicked_by: None,
        }
    }
}

/// Fields to change on every player in a bulk update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerPatch {
    pub alive: Option<bool>,
    /// `Some(None)` clears the field.
    pub kicked_by: Option<Option<PlayerId>>,
    pub clear_discovered: bool,
}

impl PlayerPatch {
    /// Empties every discovery set; used when a game starts.
    pub fn clear_discovery() -> Self {
        Self {
            clear_discovered: true,
            ..Self::default()
        }
    }

    /// Brings everybody back in: alive, no killer, nothing discovered.
    pub fn revive() -> Self {
        Self {
            alive: Some(true),
            kicked_by: Some(None),
            clear_discovered: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64) -> Player {
        NewPlayer {
            actor_id: ActorId(100 + id),
            profile: Profile::default(),
            code: "AB12".into(),
        }
        .into_player(PlayerId(id))
    }

    #[test]
    fn test_game_status_transitions() {
        use GameStatus::*;

        assert!(Waiting.can_transition_to(Running));
        assert!(Running.can_transition_to(Ended));
        assert!(Running.can_transition_to(Waiting));
        assert!(Ended.can_transition_to(Waiting));
        assert!(Waiting.can_transition_to(Waiting));

        assert!(!Waiting.can_transition_to(Ended));
        assert!(!Ended.can_transition_to(Running));
        assert!(!Running.can_transition_to(Running));
    }

    #[test]
    fn test_game_status_display_and_serde_agree() {
        for status in [GameStatus::Waiting, GameStatus::Running, GameStatus::Ended] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.to_string());
        }
    }

    #[test]
    fn test_new_game_is_waiting_with_admins() {
        let game = Game::new([ActorId(1), ActorId(2)]);
        assert_eq!(game.status, GameStatus::Waiting);
        assert!(game.is_admin(ActorId(2)));
        assert!(!game.is_admin(ActorId(3)));
    }

    #[test]
    fn test_game_apply_start_stamps_started_at() {
        let mut game = Game::new([]);
        let now = Utc::now();
        game.apply(&GamePatch::start(now));
        assert_eq!(game.status, GameStatus::Running);
        assert_eq!(game.started_at, Some(now));
        assert_eq!(game.ended_at, None);
    }

    #[test]
    fn test_new_player_starts_alive_and_empty() {
        let p = player(1);
        assert!(p.alive);
        assert!(p.discovered.is_empty());
        assert_eq!(p.kicked_by, None);
    }

    #[test]
    fn test_player_apply_revive_restores_everything() {
        let mut p = player(1);
        p.alive = false;
        p.kicked_by = Some(PlayerId(2));
        p.discovered.insert(PlayerId(2));

        p.apply(&PlayerPatch::revive());

        assert!(p.alive);
        assert_eq!(p.kicked_by, None);
        assert!(p.discovered.is_empty());
        assert_eq!(p.code, "AB12", "codes survive a reset");
    }

    #[test]
    fn test_player_apply_clear_discovery_keeps_elimination() {
        let mut p = player(1);
        p.alive = false;
        p.kicked_by = Some(PlayerId(2));
        p.discovered.insert(PlayerId(3));

        p.apply(&PlayerPatch::clear_discovery());

        assert!(!p.alive);
        assert_eq!(p.kicked_by, Some(PlayerId(2)));
        assert!(p.discovered.is_empty());
    }
}
