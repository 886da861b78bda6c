//! `CodehuntServer` builder and server loop.
//!
//! This is the entry point for running the Codehunt gateway. It ties
//! together all the layers: transport → protocol → session → engine → store.

use std::sync::Arc;
use std::time::Duration;

use codehunt_engine::{Engine, EngineConfig};
use codehunt_protocol::{Codec, JsonCodec};
use codehunt_session::{Authenticator, MemorySessions};
use codehunt_store::Store;
use codehunt_transport::{Outbox, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::CodehuntError;

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// How long a new connection has to send its handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connections that send nothing for this long are closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: Store, A: Authenticator, C: Codec> {
    pub(crate) engine: Engine<S, Outbox, MemorySessions>,
    pub(crate) outbox: Outbox,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Codehunt server.
///
/// # Example
///
/// ```rust,no_run
/// use codehunt::prelude::*;
///
/// # async fn run() -> Result<(), CodehuntError> {
/// let server = CodehuntServer::builder()
///     .bind("0.0.0.0:8080")
///     .engine_config(EngineConfig::new([ActorId(1)]))
///     .build(MemoryStore::new(), SharedSecretAuth::new("s3cret"))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct CodehuntServerBuilder {
    bind_addr: String,
    engine_config: EngineConfig,
    idle_timeout: Duration,
}

impl CodehuntServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            engine_config: EngineConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the admins and code length the engine runs with.
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and wires the engine to `store`.
    ///
    /// Uses `JsonCodec`, `WebSocketTransport`, and in-memory session state.
    pub async fn build<S: Store, A: Authenticator>(
        self,
        store: S,
        auth: A,
    ) -> Result<CodehuntServer<S, A, JsonCodec>, CodehuntError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let outbox = Outbox::new();

        let state = Arc::new(ServerState {
            engine: Engine::new(
                store,
                outbox.clone(),
                MemorySessions::new(),
                self.engine_config,
            ),
            outbox,
            auth,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(CodehuntServer { transport, state })
    }
}

impl Default for CodehuntServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Codehunt server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CodehuntServer<S: Store, A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, A, C>>,
}

impl CodehuntServer<codehunt_store::MemoryStore, codehunt_session::SharedSecretAuth, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> CodehuntServerBuilder {
        CodehuntServerBuilder::new()
    }
}

impl<S, A, C> CodehuntServer<S, A, C>
where
    S: Store,
    A: Authenticator,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The engine behind this server, for inspection.
    pub fn engine(&self) -> &Engine<S, Outbox, MemorySessions> {
        &self.state.engine
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), CodehuntError> {
        tracing::info!(version = PROTOCOL_VERSION, "Codehunt server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
