//! Axum route handlers for the AI assists.

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::assist::autofill::{extract_resume_data, AutofillRequest, ExtractedResume};
use crate::assist::improve::{improve_text, ImproveRequest};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::usage::ledger::Admission;
use crate::usage::models::FeatureType;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillResponse {
    pub extracted: ExtractedResume,
    pub tokens_used: u32,
    pub remaining: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResponse {
    pub improved: String,
    pub tokens_used: u32,
    pub remaining: u32,
}

/// Gate check. A denied attempt is answered with 429 and is not recorded.
async fn admit(state: &AppState, user_id: Uuid) -> Result<Admission, AppError> {
    let admission = state.usage.admit(user_id).await?;
    if !admission.decision.allowed {
        return Err(AppError::RateLimited {
            remaining: admission.decision.remaining,
            reset_at: admission.decision.reset_at,
        });
    }
    Ok(admission)
}

/// POST /api/ai/autofill
pub async fn handle_autofill(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AutofillRequest>,
) -> Result<Json<AutofillResponse>, AppError> {
    let admission = admit(&state, user.id).await?;

    let (extracted, tokens_used) = state
        .usage
        .tracked(user.id, FeatureType::Autofill, async {
            request.validate()?;
            extract_resume_data(&state.llm, &request.resume_text).await
        })
        .await?;

    Ok(Json(AutofillResponse {
        extracted,
        tokens_used,
        remaining: admission.decision.remaining.saturating_sub(1),
    }))
}

/// POST /api/ai/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    let admission = admit(&state, user.id).await?;

    let (improved, tokens_used) = state
        .usage
        .tracked(user.id, FeatureType::Improve, async {
            request.validate()?;
            improve_text(&state.llm, &request.text, &request.field_name).await
        })
        .await?;

    Ok(Json(ImproveResponse {
        improved,
        tokens_used,
        remaining: admission.decision.remaining.saturating_sub(1),
    }))
}
