mod assist;
mod auth;
mod config;
mod db;
mod errors;
mod forms;
mod llm_client;
mod models;
mod routes;
mod state;
mod usage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::usage::clock::SystemClock;
use crate::usage::store::PgUsageStore;
use crate::usage::{RateLimitPolicy, UsageLedger};

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

    info!("Starting applicant API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Usage ledger over the ai_usage table
    let usage = UsageLedger::new(
        Arc::new(PgUsageStore::new(db.clone())),
        Arc::new(SystemClock),
        RateLimitPolicy {
            window: Duration::seconds(config.rate_limit_window_secs),
            capacity: config.rate_limit_max_requests,
            strict: config.rate_limit_strict,
        },
    );
    let policy = usage.policy();
    info!(
        "AI rate limit: {} requests per {}s (strict: {})",
        policy.capacity,
        policy.window.num_seconds(),
        policy.strict
    );

    // Build app state
    let state = AppState {
        db,
        llm,
        usage: Arc::new(usage),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the form frontend's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
