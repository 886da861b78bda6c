//! # Codehunt
//!
//! A party game run by a chat bot. Every player gets a secret code; typing
//! another player's code discovers them, and a discovered player can be
//! kicked out. Admins start, end, and reset the round.
//!
//! This crate is the gateway: chat front-ends connect over WebSocket,
//! authenticate with the transport credential, and relay what their users
//! do as [`Intent`]s. The server answers with [`Notice`]s pushed to
//! whichever actor they concern.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codehunt::prelude::*;
//!
//! # async fn run() -> Result<(), CodehuntError> {
//! let settings = Settings::from_env()?;
//! let server = CodehuntServer::builder()
//!     .bind(&settings.bind)
//!     .engine_config(settings.engine_config())
//!     .build(MemoryStore::new(), SharedSecretAuth::new(settings.transport_token.clone()))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod settings;

pub use error::CodehuntError;
pub use server::{
    CodehuntServer, CodehuntServerBuilder, DEFAULT_IDLE_TIMEOUT, HANDSHAKE_TIMEOUT,
    PROTOCOL_VERSION,
};
pub use settings::{
    Settings, SettingsError, Storage, ADMIN_IDS_VAR, BIND_VAR, CODE_LENGTH_VAR, STORAGE_URL_VAR,
    TRANSPORT_TOKEN_VAR,
};

/// Re-exports for convenient use.
pub mod prelude {
    pub use crate::{
        CodehuntError, CodehuntServer, CodehuntServerBuilder, Settings, SettingsError, Storage,
        PROTOCOL_VERSION,
    };
    pub use codehunt_engine::{Engine, EngineConfig, EngineError};
    pub use codehunt_protocol::{
        Action, ActorId, Button, Envelope, Frame, Intent, Notice, PlayerId, Profile,
    };
    pub use codehunt_session::{Authenticator, SessionError, SharedSecretAuth};
    pub use codehunt_store::{MemoryStore, RetryPolicy, RetryingStore, Store, StoreError};
}
