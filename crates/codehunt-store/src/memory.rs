//! In-process [`Store`] with an optional JSON snapshot file.
//!
//! All documents live behind one `tokio::sync::Mutex`. Each trait method
//! takes the lock once and does its read-check-write inside it, which is
//! what makes `eliminate_if_alive`, `add_discovered`, `update_game_if` and
//! `insert_game` atomic with respect to each other.
//!
//! With a snapshot path, every write goes to disk first (a temp file,
//! then renamed over the old one) and is visible in memory only once that
//! succeeds. [`MemoryStore::open`] loads the snapshot back.

use std::path::{Path, PathBuf};

use codehunt_protocol::{ActorId, PlayerId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Game, GamePatch, GameStatus, NewPlayer, Player, PlayerPatch, Store, StoreError};

/// Everything the store holds. This is also the snapshot file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Documents {
    game: Option<Game>,
    /// Kept sorted by id; ids are assigned in increasing order.
    players: Vec<Player>,
    next_player_id: u64,
}

impl Documents {
    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }
}

/// In-process [`Store`], optionally backed by a JSON snapshot file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<Documents>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// A store that lives and dies with the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store backed by the snapshot file at `path`.
    ///
    /// Loads the file if it exists; a missing file starts empty and is
    /// created on the first write.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the file can't be read,
    /// [`StoreError::Snapshot`] if it isn't a valid snapshot.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Documents>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Documents::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            path = %path.display(),
            players = docs.players.len(),
            "snapshot store opened"
        );
        Ok(Self {
            docs: Mutex::new(docs),
            snapshot: Some(path),
        })
    }

    /// Applies `change` to the documents. With a snapshot, the change is
    /// made on a copy that becomes current only after it is on disk, so a
    /// failed write leaves memory and file in agreement.
    async fn commit<R>(
        &self,
        docs: &mut Documents,
        change: impl FnOnce(&mut Documents) -> R,
    ) -> Result<R, StoreError> {
        if self.snapshot.is_none() {
            return Ok(change(docs));
        }
        let mut next = docs.clone();
        let out = change(&mut next);
        self.persist(&next).await?;
        *docs = next;
        Ok(out)
    }

    async fn persist(&self, docs: &Documents) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(docs)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

impl Store for MemoryStore {
    async fn find_game(&self) -> Result<Option<Game>, StoreError> {
        Ok(self.docs.lock().await.game.clone())
    }

    async fn insert_game(&self, game: Game) -> Result<Game, StoreError> {
        let mut docs = self.docs.lock().await;
        if let Some(existing) = &docs.game {
            return Ok(existing.clone());
        }
        self.commit(&mut docs, |d| d.game = Some(game.clone())).await?;
        tracing::info!(admins = game.admin_ids.len(), "game record created");
        Ok(game)
    }

    async fn update_game_if(
        &self,
        expected: Option<GameStatus>,
        patch: GamePatch,
    ) -> Result<u64, StoreError> {
        let mut docs = self.docs.lock().await;
        let Some(status) = docs.game.as_ref().map(|g| g.status) else {
            return Ok(0);
        };
        if expected.is_some_and(|e| e != status) {
            return Ok(0);
        }
        self.commit(&mut docs, |d| {
            if let Some(game) = d.game.as_mut() {
                game.apply(&patch);
            }
        })
        .await?;
        Ok(1)
    }

    async fn find_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.docs.lock().await.player(id).cloned())
    }

    async fn find_player_by_actor(&self, actor: ActorId) -> Result<Option<Player>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs.players.iter().find(|p| p.actor_id == actor).cloned())
    }

    async fn find_alive_player_by_code(&self, code: &str) -> Result<Option<Player>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs
            .players
            .iter()
            .find(|p| p.alive && p.code == code)
            .cloned())
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.docs.lock().await.players.clone())
    }

    async fn create_player(&self, new: NewPlayer) -> Result<Player, StoreError> {
        let mut docs = self.docs.lock().await;
        if docs.players.iter().any(|p| p.actor_id == new.actor_id) {
            return Err(StoreError::DuplicateKey {
                collection: "players",
                key: new.actor_id.to_string(),
            });
        }
        let player = new.into_player(PlayerId(docs.next_player_id + 1));
        self.commit(&mut docs, |d| {
            d.next_player_id += 1;
            d.players.push(player.clone());
        })
        .await?;
        Ok(player)
    }

    async fn add_discovered(&self, player: PlayerId, opponent: PlayerId) -> Result<u64, StoreError> {
        let mut docs = self.docs.lock().await;
        let record = docs
            .player(player)
            .ok_or_else(|| StoreError::NotFound(player.to_string()))?;
        if record.has_discovered(opponent) {
            return Ok(0);
        }
        self.commit(&mut docs, |d| {
            if let Some(record) = d.player_mut(player) {
                record.discovered.insert(opponent);
            }
        })
        .await?;
        Ok(1)
    }

    async fn eliminate_if_alive(&self, target: PlayerId, by: PlayerId) -> Result<u64, StoreError> {
        let mut docs = self.docs.lock().await;
        if !docs.player(target).is_some_and(|p| p.alive) {
            return Ok(0);
        }
        self.commit(&mut docs, |d| {
            if let Some(record) = d.player_mut(target) {
                record.alive = false;
                record.kicked_by = Some(by);
            }
        })
        .await?;
        Ok(1)
    }

    async fn update_all_players(&self, patch: PlayerPatch) -> Result<u64, StoreError> {
        let mut docs = self.docs.lock().await;
        self.commit(&mut docs, |d| {
            for player in &mut d.players {
                player.apply(&patch);
            }
            d.players.len() as u64
        })
        .await
    }
}
