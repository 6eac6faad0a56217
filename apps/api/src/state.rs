use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::LlmClient;
use crate::usage::UsageLedger;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Rate gate and usage tracker for every AI-backed endpoint.
    pub usage: Arc<UsageLedger>,
}
