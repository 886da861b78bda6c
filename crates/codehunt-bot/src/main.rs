//! Runs the Codehunt gateway configured from the environment.
//!
//! ```text
//! CODEHUNT_TRANSPORT_TOKEN=... CODEHUNT_ADMIN_IDS=42 RUST_LOG=debug codehunt-bot
//! ```

use codehunt::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CodehuntError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
    })?;
    tracing::info!(?settings, "starting");

    let store = match &settings.storage {
        Storage::Memory => MemoryStore::new(),
        Storage::File(path) => {
            let store = MemoryStore::open(path).await?;
            tracing::info!(path = %path.display(), "game snapshot loaded");
            store
        }
    };

    serve(&settings, RetryingStore::new(store, RetryPolicy::default())).await
}

async fn serve<S: Store>(settings: &Settings, store: S) -> Result<(), CodehuntError> {
    let server = CodehuntServer::builder()
        .bind(&settings.bind)
        .engine_config(settings.engine_config())
        .build(store, SharedSecretAuth::new(settings.transport_token.clone()))
        .await?;

    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, admins = settings.admin_ids.len(), "listening");
    }
    server.run().await
}
