mod config;
mod errors;
mod generator;
mod ideas;
mod models;
mod persistence;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generator::HttpIdeaGenerator;
use crate::ideas::enhancer::TimestampIdSource;
use crate::ideas::export::{Clipboard, CommandClipboard};
use crate::ideas::session::IdeaSession;
use crate::persistence::kv::{FileKvStore, KeyValueStore, MemoryKvStore};
use crate::persistence::PersistenceAdapter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Binko API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage
    let store = build_store(&config).await?;
    let persistence = PersistenceAdapter::new(store, config.storage_keys.clone());

    // Restore the previous session, if any
    let session = IdeaSession::restore(
        persistence.load_ideas().await,
        persistence.load_profile().await,
    );

    // Initialize generator client
    let generator = HttpIdeaGenerator::new(
        config.generator_url.clone(),
        Duration::from_secs(config.generator_timeout_secs),
    )
    .context("Failed to build generator HTTP client")?;
    info!("Generator client initialized (endpoint: {})", generator.endpoint());

    // Optional clipboard sink
    let clipboard: Option<Arc<dyn Clipboard>> = match config.clipboard_command.as_deref() {
        Some(command) => {
            let clipboard = CommandClipboard::from_command_line(command)
                .context("Invalid CLIPBOARD_COMMAND")?;
            info!("Clipboard command: {command}");
            Some(Arc::new(clipboard) as Arc<dyn Clipboard>)
        }
        None => None,
    };

    // Build app state
    let state = AppState {
        session: Arc::new(Mutex::new(session)),
        generator: Arc::new(generator),
        persistence,
        ids: Arc::new(TimestampIdSource),
        clipboard,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the form's origin once it is hosted

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// File-backed store when STORAGE_DIR is set, in-memory otherwise.
async fn build_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.storage_dir {
        Some(dir) => {
            let store = FileKvStore::open(dir.clone(), Some(config.storage_quota_bytes))
                .await
                .with_context(|| format!("Failed to open storage at {}", dir.display()))?;
            info!(
                "Persisting session to {} (quota {} bytes)",
                dir.display(),
                config.storage_quota_bytes
            );
            Ok(Arc::new(store))
        }
        None => {
            warn!("STORAGE_DIR not set; session will not survive restarts");
            Ok(Arc::new(MemoryKvStore::new()))
        }
    }
}
