mod config;
mod errors;
mod matching;
mod models;
mod routes;
mod scoring_client;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::matching::cache::RecommendationCache;
use crate::matching::service::RecommendationService;
use crate::routes::build_router;
use crate::scoring_client::RemoteScoringClient;
use crate::state::AppState;

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

    info!("Starting Recommendation API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize scoring backend client
    let client = RemoteScoringClient::new(
        &config.scoring_api_url,
        config.scoring_api_token.clone(),
        config.scoring_timeout,
    )?;
    info!(
        "Scoring client initialized ({}, timeout {}s, token {})",
        config.scoring_api_url,
        config.scoring_timeout.as_secs(),
        if config.scoring_api_token.is_some() { "set" } else { "unset" }
    );

    // One cache for the whole process, owned by the facade
    let cache = Arc::new(RecommendationCache::new(config.recommendation_ttl));
    info!(
        "Recommendation cache TTL: {}s",
        config.recommendation_ttl.as_secs()
    );

    let state = AppState {
        recommendations: Arc::new(RecommendationService::new(Arc::new(client), cache)),
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
