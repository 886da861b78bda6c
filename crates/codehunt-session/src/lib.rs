//! Session layer for Codehunt.
//!
//! Two unrelated kinds of "session" state, both keyed by actor:
//!
//! 1. **Authentication**: the gateway checks the transport credential a
//!    client presents before it may speak for an actor ([`Authenticator`],
//!    [`SharedSecretAuth`]).
//! 2. **Ephemeral intent state**: the one-shot "awaiting code" flag and the
//!    pending kick selection ([`ActorSession`], [`SessionManager`],
//!    [`SessionStore`], [`MemorySessions`]). Never persisted, never read by
//!    another actor's intent.
//!
//! ```text
//! Engine (above)          ← reads/writes per-actor flags through SessionStore
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol Layer (below)  ← provides ActorId, PlayerId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;
mod store;

pub use auth::{Authenticator, SharedSecretAuth};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::ActorSession;
pub use store::{MemorySessions, SessionStore};
