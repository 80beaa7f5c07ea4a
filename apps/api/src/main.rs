mod config;
mod editor;
mod errors;
mod export;
mod models;
mod remote;
mod repository;
mod routes;
mod scoring;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::remote::{RemoteClient, ResumeOptimizer};
use crate::repository::{FileResumeRepository, InMemoryResumeRepository, ResumeRepository};
use crate::routes::build_router;
use crate::session::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize resume storage
    let repository: Arc<dyn ResumeRepository> = match &config.resume_store_dir {
        Some(dir) => Arc::new(FileResumeRepository::open(dir.clone()).await?),
        None => {
            info!("RESUME_STORE_DIR not set; resumes are kept in memory only");
            Arc::new(InMemoryResumeRepository::new())
        }
    };

    // Initialize remote backend (optional)
    let remote = match &config.remote_api_url {
        Some(url) => {
            let client = RemoteClient::new(url, config.remote_timeout(), config.remote_retry_attempts)?
                .with_backoff(config.remote_backoff());
            info!("Remote backend: {url}");
            Some(client)
        }
        None => {
            info!("REMOTE_API_URL not set; optimization uses local scoring only");
            None
        }
    };
    let optimizer = remote
        .clone()
        .map(|client| Arc::new(client) as Arc<dyn ResumeOptimizer>);

    let settings = config.session_settings();
    info!(
        "Debounce: scoring {}ms, autosave {}ms",
        settings.scoring_debounce.as_millis(),
        settings.autosave_debounce.as_millis()
    );
    let sessions = Arc::new(SessionRegistry::new(repository, settings));

    // Build app state
    let state = AppState {
        sessions: sessions.clone(),
        remote,
        optimizer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let flushed = sessions.flush_all().await;
    info!("Shutdown complete; flushed {flushed} unsaved session(s)");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
