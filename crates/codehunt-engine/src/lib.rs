//! The Codehunt game engine.
//!
//! A state machine over one [`Game`](codehunt_store::Game) record and its
//! [`Player`](codehunt_store::Player)s:
//!
//! ```text
//! Waiting --start_game--> Running --end_game--> Ended
//!    ^                                            |
//!    +----------------- reset_game ---------------+
//! ```
//!
//! While the game runs, players enter each other's secret codes to
//! *discover* one another (symmetric) and may *kick* a discovered
//! opponent after confirming. Admins drive the lifecycle.
//!
//! [`Engine`] is generic over its three collaborators: a
//! [`Store`](codehunt_store::Store) for durable records, a
//! [`Notifier`](codehunt_transport::Notifier) for talking to actors, and a
//! [`SessionStore`](codehunt_session::SessionStore) for per-actor flags.

mod code;
mod config;
mod engine;
mod error;
pub mod notices;

pub use code::{generate_code, CODE_ALPHABET};
pub use config::{EngineConfig, DEFAULT_CODE_LENGTH};
pub use engine::Engine;
pub use error::EngineError;
