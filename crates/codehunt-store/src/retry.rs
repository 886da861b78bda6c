//! Bounded retries for transient store failures.
//!
//! [`RetryingStore`] wraps any [`Store`] and re-issues a call when it fails
//! with an error for which [`StoreError::is_transient`] is true. Everything
//! else (duplicate keys, missing records, corrupt snapshots) surfaces on
//! the first attempt.

use std::time::Duration;

use codehunt_protocol::{ActorId, PlayerId};

use crate::{Game, GamePatch, GameStatus, NewPlayer, Player, PlayerPatch, Store, StoreError};

/// How hard to try before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `1` disables retrying.
    pub attempts: u32,
    /// Wait before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

/// A [`Store`] wrapper that retries transient failures per its [`RetryPolicy`].
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: Store> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

/// Re-evaluates `$call` until it succeeds, fails for good, or the policy's
/// attempt budget runs out.
macro_rules! with_retry {
    ($self:ident, $op:literal, $call:expr) => {{
        let mut attempt: u32 = 1;
        loop {
            match $call.await {
                Err(e) if e.is_transient() && attempt < $self.policy.attempts => {
                    tracing::warn!(
                        operation = $op,
                        attempt,
                        max_attempts = $self.policy.attempts,
                        error = %e,
                        "transient store error, retrying"
                    );
                    tokio::time::sleep($self.policy.backoff * attempt).await;
                    attempt += 1;
                }
                other => break other,
            }
        }
    }};
}

impl<S: Store> Store for RetryingStore<S> {
    async fn find_game(&self) -> Result<Option<Game>, StoreError> {
        with_retry!(self, "find_game", self.inner.find_game())
    }

    async fn insert_game(&self, game: Game) -> Result<Game, StoreError> {
        with_retry!(self, "insert_game", self.inner.insert_game(game.clone()))
    }

    async fn update_game_if(
        &self,
        expected: Option<GameStatus>,
        patch: GamePatch,
    ) -> Result<u64, StoreError> {
        with_retry!(
            self,
            "update_game_if",
            self.inner.update_game_if(expected, patch.clone())
        )
    }

    async fn find_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        with_retry!(self, "find_player", self.inner.find_player(id))
    }

    async fn find_player_by_actor(&self, actor: ActorId) -> Result<Option<Player>, StoreError> {
        with_retry!(self, "find_player_by_actor", self.inner.find_player_by_actor(actor))
    }

    async fn find_alive_player_by_code(&self, code: &str) -> Result<Option<Player>, StoreError> {
        with_retry!(
            self,
            "find_alive_player_by_code",
            self.inner.find_alive_player_by_code(code)
        )
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        with_retry!(self, "list_players", self.inner.list_players())
    }

    async fn create_player(&self, new: NewPlayer) -> Result<Player, StoreError> {
        with_retry!(self, "create_player", self.inner.create_player(new.clone()))
    }

    async fn add_discovered(&self, player: PlayerId, opponent: PlayerId) -> Result<u64, StoreError> {
        with_retry!(self, "add_discovered", self.inner.add_discovered(player, opponent))
    }

    async fn eliminate_if_alive(&self, target: PlayerId, by: PlayerId) -> Result<u64, StoreError> {
        with_retry!(self, "eliminate_if_alive", self.inner.eliminate_if_alive(target, by))
    }

    async fn update_all_players(&self, patch: PlayerPatch) -> Result<u64, StoreError> {
        with_retry!(
            self,
            "update_all_players",
            self.inner.update_all_players(patch.clone())
        )
    }
}
