//! The persistence seam.

use std::future::Future;
use std::sync::Arc;

use codehunt_protocol::{ActorId, PlayerId};

use crate::{Game, GamePatch, GameStatus, NewPlayer, Player, PlayerPatch, StoreError};

/// Document-style access to the game record and the players.
///
/// Methods that return a `u64` report the number of records they changed.
/// Conditional writes report `0` when their condition didn't hold, which is
/// how the engine learns it lost a race.
///
/// Every future is `Send` so engine operations can run in spawned tasks.
pub trait Store: Send + Sync + 'static {
    /// The game record, if one exists.
    fn find_game(&self) -> impl Future<Output = Result<Option<Game>, StoreError>> + Send;

    /// Inserts `game` unless a record already exists.
    ///
    /// Returns whichever record is stored afterwards, so concurrent
    /// creators all converge on the first writer's record.
    fn insert_game(&self, game: Game) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Applies `patch` if the current status equals `expected`
    /// (`None` means unconditionally). Returns rows affected.
    fn update_game_if(
        &self,
        expected: Option<GameStatus>,
        patch: GamePatch,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn find_player(
        &self,
        id: PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    fn find_player_by_actor(
        &self,
        actor: ActorId,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    /// The alive player holding `code`, lowest id first if several do.
    fn find_alive_player_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Player>, StoreError>> + Send;

    /// Every player, ordered by id.
    fn list_players(&self) -> impl Future<Output = Result<Vec<Player>, StoreError>> + Send;

    /// Creates a player.
    ///
    /// # Errors
    /// [`StoreError::DuplicateKey`] if the actor already has a record.
    fn create_player(
        &self,
        new: NewPlayer,
    ) -> impl Future<Output = Result<Player, StoreError>> + Send;

    /// Adds `opponent` to `player`'s discovered set (set semantics).
    /// Returns `1` if the set grew, `0` if it already held `opponent`.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if `player` doesn't exist.
    fn add_discovered(
        &self,
        player: PlayerId,
        opponent: PlayerId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Marks `target` dead with `kicked_by = by`, only if it is still alive.
    /// Returns `1` for the winner of a race, `0` for everybody else.
    fn eliminate_if_alive(
        &self,
        target: PlayerId,
        by: PlayerId,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Applies `patch` to every player. Returns rows affected.
    fn update_all_players(
        &self,
        patch: PlayerPatch,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

impl<S: Store> Store for Arc<S> {
    async fn find_game(&self) -> Result<Option<Game>, StoreError> {
        (**self).find_game().await
    }

    async fn insert_game(&self, game: Game) -> Result<Game, StoreError> {
        (**self).insert_game(game).await
    }

    async fn update_game_if(
        &self,
        expected: Option<GameStatus>,
        patch: GamePatch,
    ) -> Result<u64, StoreError> {
        (**self).update_game_if(expected, patch).await
    }

    async fn find_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        (**self).find_player(id).await
    }

    async fn find_player_by_actor(&self, actor: ActorId) -> Result<Option<Player>, StoreError> {
        (**self).find_player_by_actor(actor).await
    }

    async fn find_alive_player_by_code(&self, code: &str) -> Result<Option<Player>, StoreError> {
        (**self).find_alive_player_by_code(code).await
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        (**self).list_players().await
    }

    async fn create_player(&self, new: NewPlayer) -> Result<Player, StoreError> {
        (**self).create_player(new).await
    }

    async fn add_discovered(&self, player: PlayerId, opponent: PlayerId) -> Result<u64, StoreError> {
        (**self).add_discovered(player, opponent).await
    }

    async fn eliminate_if_alive(&self, target: PlayerId, by: PlayerId) -> Result<u64, StoreError> {
        (**self).eliminate_if_alive(target, by).await
    }

    async fn update_all_players(&self, patch: PlayerPatch) -> Result<u64, StoreError> {
        (**self).update_all_players(patch).await
    }
}
