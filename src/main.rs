//! Quizlexa - voice skill for studying Quizlet flashcard sets
//!
//! A Rust backend implementing the dialogue state machine that lets a user
//! browse their sets and classes, review terms, and take quizzes by voice.

mod api;
mod credential;
mod db;
mod prompts;
mod quiz;
mod quizlet;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use db::Database;
use prompts::EnglishCatalog;
use quizlet::QuizletConfig;
use runtime::{DatabaseSessionStore, ProductionRuntime, QuizletConnector};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
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
                .unwrap_or_else(|_| "quizlexa=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("QUIZLEXA_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.quizlexa/quizlexa.db")
    });

    let port: u16 = std::env::var("QUIZLEXA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    let quizlet_config = QuizletConfig::from_env();
    tracing::info!(
        api_base = %quizlet_config.api_base,
        "Quizlet gateway configured"
    );
    let connector = QuizletConnector::new(quizlet_config)?;

    let runtime = ProductionRuntime::new(
        DatabaseSessionStore::new(db),
        connector,
        Arc::new(EnglishCatalog),
    );
    let state = AppState::new(runtime);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Quizlexa server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
