mod analysis;
mod cache;
mod config;
mod db;
mod errors;
mod listings;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod routes;
mod state;
mod store;
mod vector_index;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::SearchCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::listings::HttpListingsSource;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vector_index::HttpVectorIndex;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let generator = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize vector index client
    let index = Arc::new(HttpVectorIndex::new(
        config.vector_index_url.clone(),
        config.vector_api_key.clone(),
    ));
    info!("Vector index client initialized (namespace: {})", config.vector_namespace);

    // Initialize listings client
    let listings = Arc::new(HttpListingsSource::new(
        config.listings_api_url.clone(),
        config.listings_api_key.clone(),
    ));
    info!("Listings client initialized");

    // Build app state
    let state = AppState {
        db,
        generator,
        index,
        listings,
        cache: Arc::new(SearchCache::default()),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
