//! The game engine.
//!
//! Every operation is one intent from one actor. The engine holds no game
//! state of its own: it re-reads the game and player records from the
//! [`Store`] on every call, keeps the per-actor flags in the
//! [`SessionStore`], and talks back through the [`Notifier`]. Many intents
//! can run at once; the store's conditional writes decide races.

use chrono::Utc;
use codehunt_protocol::{Action, ActorId, Intent, Notice, PlayerId, Profile, MENU_KEYWORD};
use codehunt_session::SessionStore;
use codehunt_store::{Game, GamePatch, GameStatus, NewPlayer, Player, PlayerPatch, Store, StoreError};
use codehunt_transport::Notifier;

use crate::code::generate_code;
use crate::notices;
use crate::{EngineConfig, EngineError};

/// Where the actor stands before a running-game command.
enum Standing {
    Ready(Player),
    Rejected,
}

/// Runs game operations for actors on top of the collaborator seams.
pub struct Engine<S, N, T> {
    store: S,
    notifier: N,
    sessions: T,
    config: EngineConfig,
}

impl<S, N, T> Engine<S, N, T>
where
    S: Store,
    N: Notifier,
    T: SessionStore,
{
    pub fn new(store: S, notifier: N, sessions: T, config: EngineConfig) -> Self {
        Self {
            store,
            notifier,
            sessions,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =====================================================================
    // Dispatch
    // =====================================================================

    /// Parses `intent` and runs the matching operation.
    ///
    /// Unknown commands and buttons are logged and dropped.
    pub async fn dispatch(&self, actor: ActorId, intent: Intent) -> Result<(), EngineError> {
        match Action::parse(intent) {
            Ok(action) => self.perform(actor, action).await,
            Err(e) => {
                tracing::debug!(%actor, error = %e, "ignoring unrecognized intent");
                Ok(())
            }
        }
    }

    /// Runs one parsed action for `actor`.
    ///
    /// If the operation fails, the actor is told "Something went wrong."
    /// and the error is returned for the caller to log.
    pub async fn perform(&self, actor: ActorId, action: Action) -> Result<(), EngineError> {
        self.perform_as(actor, action, &Profile::default()).await
    }

    /// Like [`perform`](Self::perform), for a caller that already knows
    /// the actor's `profile` (the gateway gets one at handshake). Entries
    /// that carry no profile of their own, `/start` and the menu keyword,
    /// register with it.
    pub async fn perform_as(
        &self,
        actor: ActorId,
        action: Action,
        profile: &Profile,
    ) -> Result<(), EngineError> {
        let name = action.name();
        tracing::debug!(%actor, action = name, "performing");

        let result = match action {
            Action::Enter(p) if p == Profile::default() => {
                self.on_entry(actor, profile.clone()).await
            }
            Action::Enter(p) => self.on_entry(actor, p).await,
            Action::BeginCode => self.begin_code_entry(actor).await,
            Action::Text(text) => self.text(actor, &text, profile).await,
            Action::ListOpponents => self.list_opponents(actor).await,
            Action::RequestKick(target) => self.request_kick(actor, target).await,
            Action::ConfirmKick => self.confirm_kick(actor).await,
            Action::CancelKick => self.cancel_kick(actor).await,
            Action::StartGame => self.start_game(actor).await,
            Action::EndGame => self.end_game(actor).await,
            Action::ResetGame => self.reset_game(actor).await,
            Action::ListPlayers => self.list_players(actor).await,
        };

        if let Err(e) = &result {
            tracing::warn!(%actor, action = name, error = %e, "action failed");
            if let Err(notify_err) = self
                .notifier
                .notify(actor, Notice::text(notices::SOMETHING_WENT_WRONG))
                .await
            {
                tracing::debug!(%actor, error = %notify_err, "could not report failure");
            }
        }
        result
    }

    // =====================================================================
    // Records
    // =====================================================================

    /// The game record, created in `Waiting` with the configured admins if
    /// it doesn't exist yet.
    pub async fn get_or_create_game(&self) -> Result<Game, EngineError> {
        if let Some(game) = self.store.find_game().await? {
            return Ok(game);
        }
        let game = self
            .store
            .insert_game(Game::new(self.config.admin_ids.iter().copied()))
            .await?;
        Ok(game)
    }

    /// The actor's player record, created with a fresh code on first sight.
    /// An existing record is returned as is; `profile` is ignored for it.
    pub async fn register_or_fetch_player(
        &self,
        actor: ActorId,
        profile: Profile,
    ) -> Result<Player, EngineError> {
        let (player, _) = self.register(actor, profile).await?;
        Ok(player)
    }

    /// Like [`register_or_fetch_player`](Self::register_or_fetch_player),
    /// also reporting whether the record was created by this call.
    async fn register(&self, actor: ActorId, profile: Profile) -> Result<(Player, bool), EngineError> {
        if let Some(player) = self.store.find_player_by_actor(actor).await? {
            return Ok((player, false));
        }
        let new = NewPlayer {
            actor_id: actor,
            profile,
            code: generate_code(self.config.code_length),
        };
        match self.store.create_player(new).await {
            Ok(player) => {
                tracing::info!(%actor, player = %player.id, "player registered");
                Ok((player, true))
            }
            Err(StoreError::DuplicateKey { .. }) => {
                // A concurrent entry from the same actor registered first.
                let player = self
                    .store
                    .find_player_by_actor(actor)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(actor.to_string()))?;
                Ok((player, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn running_player(&self, actor: ActorId) -> Result<Standing, EngineError> {
        let game = self.get_or_create_game().await?;
        if !game.status.is_running() {
            self.reply(actor, notices::GAME_NOT_RUNNING).await?;
            return Ok(Standing::Rejected);
        }
        match self.store.find_player_by_actor(actor).await? {
            Some(player) if player.alive => Ok(Standing::Ready(player)),
            _ => {
                self.reply(actor, notices::GAME_OVER).await?;
                Ok(Standing::Rejected)
            }
        }
    }

    // =====================================================================
    // Player operations
    // =====================================================================

    /// The actor opened the bot. Registers them if needed and says where
    /// they stand. Never mutates the game.
    pub async fn on_entry(&self, actor: ActorId, profile: Profile) -> Result<(), EngineError> {
        let game = self.get_or_create_game().await?;
        let (player, created) = self.register(actor, profile).await?;

        if created {
            self.announce_join(&game, &player).await;
        }

        if !player.alive {
            let kicker = match player.kicked_by {
                Some(id) => self.store.find_player(id).await?,
                None => None,
            };
            return self.send(actor, notices::kicked_on_entry(kicker.as_ref())).await;
        }
        if !game.status.is_running() {
            return self.reply(actor, notices::GAME_NOT_STARTED_YET).await;
        }
        self.reply(actor, notices::GAME_ON).await
    }

    /// `/code`: the next text the actor sends is a code attempt.
    pub async fn begin_code_entry(&self, actor: ActorId) -> Result<(), EngineError> {
        if let Standing::Rejected = self.running_player(actor).await? {
            return Ok(());
        }
        self.sessions.arm_code_entry(actor).await;
        self.reply(actor, notices::SEND_A_CODE).await
    }

    /// Free text from the actor: a code attempt if one is armed, the menu
    /// keyword as an entry, anything else ignored.
    pub async fn handle_text(&self, actor: ActorId, text: &str) -> Result<(), EngineError> {
        self.text(actor, text, &Profile::default()).await
    }

    async fn text(&self, actor: ActorId, text: &str, profile: &Profile) -> Result<(), EngineError> {
        if self.sessions.take_code_entry(actor).await {
            return self.resolve_code(actor, text).await;
        }
        if text.trim().eq_ignore_ascii_case(MENU_KEYWORD) {
            return self.on_entry(actor, profile.clone()).await;
        }
        tracing::trace!(%actor, "ignoring unsolicited text");
        Ok(())
    }

    /// A code attempt. Does nothing unless `/code` armed one; the flag is
    /// consumed either way.
    pub async fn submit_code(&self, actor: ActorId, text: &str) -> Result<(), EngineError> {
        if !self.sessions.take_code_entry(actor).await {
            return Ok(());
        }
        self.resolve_code(actor, text).await
    }

    async fn resolve_code(&self, actor: ActorId, text: &str) -> Result<(), EngineError> {
        let code = text.trim();
        let Some(me) = self.store.find_player_by_actor(actor).await? else {
            return Ok(());
        };
        if !me.alive {
            return self.reply(actor, notices::GAME_OVER).await;
        }
        if code == me.code {
            return self.reply(actor, notices::OWN_CODE).await;
        }
        let Some(opponent) = self.store.find_alive_player_by_code(code).await? else {
            return self.reply(actor, notices::NO_MATCH).await;
        };
        if me.has_discovered(opponent.id) {
            return self.reply(actor, notices::ALREADY_DISCOVERED).await;
        }

        // Actor's side first, then the opponent's. Set-adds are idempotent,
        // so the mirror call from the opponent can interleave freely.
        self.store.add_discovered(me.id, opponent.id).await?;
        if let Err(e) = self.store.add_discovered(opponent.id, me.id).await {
            tracing::error!(
                player = %me.id,
                opponent = %opponent.id,
                error = %e,
                "discovery recorded on one side only"
            );
            return Err(EngineError::PartialWrite {
                operation: "submit_code",
                detail: format!("{} has {}, {} may lack {}: {e}", me.id, opponent.id, opponent.id, me.id),
            });
        }
        tracing::info!(player = %me.id, opponent = %opponent.id, "discovery");

        self.send(actor, notices::discovered(&opponent)).await?;
        if let Err(e) = self
            .notifier
            .notify(opponent.actor_id, notices::discovered(&me))
            .await
        {
            tracing::warn!(opponent = %opponent.id, error = %e, "discovery notice not delivered");
        }
        Ok(())
    }

    /// `/list`: discovered opponents who are still alive, as kick buttons.
    pub async fn list_opponents(&self, actor: ActorId) -> Result<(), EngineError> {
        let Standing::Ready(me) = self.running_player(actor).await? else {
            return Ok(());
        };
        let opponents: Vec<Player> = self
            .store
            .list_players()
            .await?
            .into_iter()
            .filter(|p| p.alive && me.has_discovered(p.id))
            .collect();

        if opponents.is_empty() {
            return self.reply(actor, notices::NO_OPPONENTS).await;
        }
        self.send(actor, notices::opponents(&opponents)).await
    }

    /// A kick button: remember the target and ask for confirmation.
    pub async fn request_kick(&self, actor: ActorId, target: PlayerId) -> Result<(), EngineError> {
        self.sessions.select_kick(actor, target).await;
        self.send(actor, notices::confirm_kick()).await
    }

    /// Carries out the pending kick, if there is one.
    pub async fn confirm_kick(&self, actor: ActorId) -> Result<(), EngineError> {
        let Some(target_id) = self.sessions.take_kick(actor).await else {
            tracing::debug!(%actor, "confirm without a pending kick");
            return Ok(());
        };

        let me = self.store.find_player_by_actor(actor).await?;
        let target = self.store.find_player(target_id).await?;
        let (Some(me), Some(target)) = (me, target) else {
            return self.reply(actor, notices::SOMETHING_WENT_WRONG).await;
        };

        if self.store.eliminate_if_alive(target.id, me.id).await? == 0 {
            return self.reply(actor, notices::ALREADY_OUT).await;
        }
        tracing::info!(player = %me.id, target = %target.id, "player kicked");

        let acknowledged = self.send(actor, notices::you_kicked(&target)).await;
        let told_target = self
            .notifier
            .notify(target.actor_id, notices::kicked_by(&me))
            .await
            .map_err(EngineError::from);
        self.broadcast_out(&me, &target).await;

        if let Err(e) = acknowledged.and(told_target) {
            tracing::error!(
                player = %me.id,
                target = %target.id,
                error = %e,
                "kick applied but not everyone was told"
            );
            return Err(EngineError::PartialWrite {
                operation: "confirm_kick",
                detail: format!("{} eliminated by {}: {e}", target.id, me.id),
            });
        }
        Ok(())
    }

    /// Drops the pending kick.
    pub async fn cancel_kick(&self, actor: ActorId) -> Result<(), EngineError> {
        self.sessions.take_kick(actor).await;
        self.reply(actor, notices::KICK_CANCELLED).await
    }

    // =====================================================================
    // Admin operations
    // =====================================================================

    /// Whether `actor` may run lifecycle commands on `game`.
    pub fn is_admin(game: &Game, actor: ActorId) -> bool {
        game.is_admin(actor)
    }

    async fn admin_game(&self, actor: ActorId) -> Result<Option<Game>, EngineError> {
        let game = self.get_or_create_game().await?;
        if !Self::is_admin(&game, actor) {
            tracing::debug!(%actor, "lifecycle command from non-admin ignored");
            return Ok(None);
        }
        Ok(Some(game))
    }

    /// `Waiting -> Running`, then a fresh round: every discovery set emptied.
    pub async fn start_game(&self, actor: ActorId) -> Result<(), EngineError> {
        let Some(game) = self.admin_game(actor).await? else {
            return Ok(());
        };
        let started = self
            .store
            .update_game_if(Some(GameStatus::Waiting), GamePatch::start(Utc::now()))
            .await?;
        if started == 0 {
            return self.reply(actor, notices::ALREADY_STARTED).await;
        }
        if let Err(e) = self.store.update_all_players(PlayerPatch::clear_discovery()).await {
            tracing::error!(error = %e, "game running but discovery sets not cleared");
            return Err(EngineError::PartialWrite {
                operation: "start_game",
                detail: format!("status is running, discovery sets kept: {e}"),
            });
        }
        tracing::info!(%actor, "game started");

        self.reply(actor, notices::STARTED).await?;
        self.broadcast_players(&game, notices::START_BROADCAST).await
    }

    /// `Running -> Ended`.
    pub async fn end_game(&self, actor: ActorId) -> Result<(), EngineError> {
        let Some(game) = self.admin_game(actor).await? else {
            return Ok(());
        };
        let ended = self
            .store
            .update_game_if(Some(GameStatus::Running), GamePatch::end(Utc::now()))
            .await?;
        if ended == 0 {
            return self.reply(actor, notices::NOT_RUNNING).await;
        }
        tracing::info!(%actor, "game ended");

        self.reply(actor, notices::ENDED).await?;
        self.broadcast_players(&game, notices::END_BROADCAST).await
    }

    /// Back to `Waiting` from anywhere, everybody alive again. Codes stay.
    pub async fn reset_game(&self, actor: ActorId) -> Result<(), EngineError> {
        if self.admin_game(actor).await?.is_none() {
            return Ok(());
        }
        self.store.update_game_if(None, GamePatch::reset()).await?;
        if let Err(e) = self.store.update_all_players(PlayerPatch::revive()).await {
            tracing::error!(error = %e, "game waiting but players not revived");
            return Err(EngineError::PartialWrite {
                operation: "reset_game",
                detail: format!("status is waiting, players not revived: {e}"),
            });
        }
        tracing::info!(%actor, "game reset");
        self.reply(actor, notices::RESET).await
    }

    /// `/players`: the roster with codes, for admins.
    pub async fn list_players(&self, actor: ActorId) -> Result<(), EngineError> {
        let Some(game) = self.admin_game(actor).await? else {
            return Ok(());
        };
        let players = self.store.list_players().await?;
        let roster: Vec<&Player> = players
            .iter()
            .filter(|p| !game.is_admin(p.actor_id))
            .collect();
        self.send(actor, notices::roster(&roster)).await
    }

    // =====================================================================
    // Notices
    // =====================================================================

    async fn reply(&self, actor: ActorId, text: &str) -> Result<(), EngineError> {
        self.send(actor, Notice::text(text)).await
    }

    async fn send(&self, actor: ActorId, notice: Notice) -> Result<(), EngineError> {
        self.notifier.notify(actor, notice).await?;
        Ok(())
    }

    /// Tells the admins a new player showed up. Best effort.
    async fn announce_join(&self, game: &Game, player: &Player) {
        for &admin in game.admin_ids.iter().filter(|&&a| a != player.actor_id) {
            if let Err(e) = self.notifier.notify(admin, notices::player_joined(player)).await {
                tracing::debug!(%admin, error = %e, "join notice not delivered");
            }
        }
    }

    /// Tells every other alive player that `target` is gone. Best effort.
    async fn broadcast_out(&self, me: &Player, target: &Player) {
        let players = match self.store.list_players().await {
            Ok(players) => players,
            Err(e) => {
                tracing::warn!(error = %e, "could not load players for kick broadcast");
                return;
            }
        };
        for p in players
            .iter()
            .filter(|p| p.alive && p.id != me.id && p.id != target.id)
        {
            if let Err(e) = self.notifier.notify(p.actor_id, notices::out_of_game(target)).await {
                tracing::debug!(player = %p.id, error = %e, "kick broadcast not delivered");
            }
        }
    }

    /// Sends `text` to every non-admin player. Delivery is best effort;
    /// only a failure to load the players is an error.
    async fn broadcast_players(&self, game: &Game, text: &str) -> Result<(), EngineError> {
        let players = self.store.list_players().await?;
        let mut missed = 0usize;
        for p in players.iter().filter(|p| !game.is_admin(p.actor_id)) {
            if self.notifier.notify(p.actor_id, Notice::text(text)).await.is_err() {
                missed += 1;
            }
        }
        if missed > 0 {
            tracing::warn!(missed, "broadcast not delivered to every player");
        }
        Ok(())
    }
}
