//! An toàn Số - cyber-safety advisor
//!
//! Serves a streaming chat with a hosted model acting as a friendly
//! security advisor, plus generated quizzes, over HTTP and SSE.

mod api;
mod config;
mod conversation;
mod db;
mod llm;
mod quiz;
mod runtime;

use api::{create_router, AppState};
use config::AppConfig;
use db::Database;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "an_toan_so=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();

    // Initialize database
    tracing::info!(path = %config.db_path.display(), "Opening preferences database");
    let db = Database::open(&config.db_path)?;
    tracing::info!(theme = %db.get_theme()?, "Loaded theme preference");

    // Initialize LLM service
    if config.llm.has_credentials() {
        tracing::info!(model = %config.llm.model, "LLM service initialized");
    } else {
        tracing::warn!("No LLM credentials configured. Set GEMINI_API_KEY or LLM_GATEWAY.");
    }
    let llm = llm::from_config(&config.llm);

    // Create application state
    let state = AppState::new(db, llm);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Advisor server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
