use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::usage::models::UsageStats;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub total_used: u32,
    pub stats: UsageStats,
}

/// GET /api/ai/usage
pub async fn handle_get_usage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UsageResponse>, AppError> {
    let decision = state.usage.check_rate_limit(user.id).await?;
    let stats = state.usage.get_ai_usage_stats(user.id).await?;

    Ok(Json(UsageResponse {
        remaining: decision.remaining,
        reset_at: decision.reset_at,
        total_used: decision.total_used,
        stats,
    }))
}
