//! Persistence layer for Codehunt.
//!
//! - **Model** ([`Game`], [`GameStatus`], [`Player`]): the durable records.
//! - **[`Store`]**: the seam the engine reads and writes through. Every
//!   write that other actors can race on is a single conditional or
//!   set-style operation, so the store decides who wins.
//! - **[`MemoryStore`]**: in-process implementation, optionally
//!   snapshotted to a JSON file after every write.
//! - **[`RetryingStore`]**: wraps any store and retries transient failures.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod model;
mod retry;
mod store;

pub use codehunt_protocol::Profile;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use model::{Game, GamePatch, GameStatus, NewPlayer, Player, PlayerPatch};
pub use retry::{RetryPolicy, RetryingStore};
pub use store::Store;
