mod config;
mod editor;
mod errors;
mod export;
mod extract;
mod llm_client;
mod models;
mod render;
mod routes;
mod session;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::editor::requests::RequestTracker;
use crate::editor::rewrite::LlmRefiner;
use crate::export::raster::CommandRasterizer;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionController;
use crate::state::AppState;
use crate::storage::{open_store, ResumeVault};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Storage backend + resume vault
    let store = open_store(&config).await?;
    let mut controller = SessionController::new(ResumeVault::new(store));
    match controller.restore().await {
        Some(email) => info!("Restored last session for {email}"),
        None => info!("No previous session to restore"),
    }

    // Rewrite collaborator
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Export collaborator
    info!("Rasterizer: {}", config.rasterizer_bin);

    let state = AppState {
        session: Arc::new(Mutex::new(controller)),
        requests: RequestTracker::shared(),
        refiner: Arc::new(LlmRefiner::new(llm)),
        rasterizer: Arc::new(CommandRasterizer::new(config.rasterizer_bin.clone())),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
