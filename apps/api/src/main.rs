mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod reconcile;
mod resume;
mod routes;
mod state;
mod utils;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmGateway;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; nothing is required, a missing API key only enables fallback mode
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

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    errors::set_verbose_errors(!config.environment.is_production());

    // Initialize LLM gateway
    let llm = LlmGateway::from_config(&config)?;
    if llm.is_configured() {
        info!(
            "LLM gateway initialized (model: {}, timeout: {}s)",
            llm_client::MODEL,
            config.llm_timeout.as_secs()
        );
    } else {
        warn!("ANTHROPIC_API_KEY not set: LLM features will return fallback results");
    }

    let state = AppState {
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
