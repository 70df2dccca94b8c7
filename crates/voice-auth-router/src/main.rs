//! Voice authentication call router - Entry point.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voice_auth_router::{
    api::{create_router, AppState},
    config::{Config, LogConfig, StoreBackend},
    FileStore, IdentityStore, MemoryStore,
};
use voiceit_client::VoiceItClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.log);

    info!("Starting voice authentication call router");

    // Long-lived provider client, shared by every invocation
    let provider = VoiceItClient::new(
        &config.voiceit.api_key,
        &config.voiceit.api_token,
        &config.voiceit.base_url,
        config.voiceit.timeout,
    )
    .context("Failed to create VoiceIt client")?;

    let store: Arc<dyn IdentityStore> = match config.store.backend {
        StoreBackend::File => {
            let store = FileStore::new(config.store.path.clone());
            info!("Using identity file {:?}", store.path());
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Using in-memory identity store (records are lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, Arc::new(provider));
    let app = create_router(state);

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address {}", config.server.listen_addr))?,
        config.server.port,
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
