mod config;
mod errors;
mod jobs;
mod llm_client;
mod pipeline;
mod profile;
mod recommendation;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Keys are checked again on first use; this only makes a bad deploy obvious early.
    if config.serpapi_key.is_none() {
        warn!("SERPAPI_KEY is not set; job searches will fail until it is configured");
    }
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY is not set; recommendations will fail until it is configured");
    }
    info!("LLM client initialized (model: {})", config.groq_model);

    let port = config.port;
    let state = AppState::from_config(config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
