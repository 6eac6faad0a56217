use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json as SqlJson;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::forms::models::{
    CompleteFormData, FormData, FormProgressRow, FormSubmissionRow, FORM_STEPS,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressRequest {
    pub form_data: FormData,
    pub current_step: i32,
}

impl SaveProgressRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=FORM_STEPS).contains(&self.current_step) {
            return Err(AppError::Validation(format!(
                "currentStep must be between 1 and {FORM_STEPS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressResponse {
    pub success: bool,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub has_progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<i32>,
}

impl From<Option<FormProgressRow>> for ProgressResponse {
    fn from(row: Option<FormProgressRow>) -> Self {
        match row {
            Some(row) => Self {
                has_progress: true,
                data: Some(row.form_data),
                current_step: Some(row.current_step),
            },
            None => Self {
                has_progress: false,
                data: None,
                current_step: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub form_data: CompleteFormData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub submission_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SubmissionsResponse {
    pub submissions: Vec<FormSubmissionRow>,
}

/// POST /api/forms/save
pub async fn handle_save_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SaveProgressRequest>,
) -> Result<Json<SaveProgressResponse>, AppError> {
    request.validate()?;

    // One progress row per user
    let saved_at: DateTime<Utc> = sqlx::query_scalar(
        r#"
        INSERT INTO form_progress (user_id, form_data, current_step, last_saved_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (user_id) DO UPDATE
            SET form_data = EXCLUDED.form_data,
                current_step = EXCLUDED.current_step,
                last_saved_at = EXCLUDED.last_saved_at
        RETURNING last_saved_at
        "#,
    )
    .bind(user.id)
    .bind(SqlJson(&request.form_data))
    .bind(request.current_step)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(SaveProgressResponse {
        success: true,
        saved_at,
    }))
}

/// GET /api/forms/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProgressResponse>, AppError> {
    let row = sqlx::query_as::<_, FormProgressRow>("SELECT * FROM form_progress WHERE user_id = $1")
        .bind(user.id)
        .fetch_optional(&state.db)
        .await?;

    Ok(Json(row.into()))
}

/// POST /api/forms/submit
///
/// Stores the submission and clears the saved progress in one transaction.
pub async fn handle_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut tx = state.db.begin().await?;

    let submission_id: Uuid = sqlx::query_scalar(
        "INSERT INTO form_submissions (user_id, form_data) VALUES ($1, $2) RETURNING id",
    )
    .bind(user.id)
    .bind(SqlJson(&request.form_data))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM form_progress WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Stored form submission {submission_id} for user {}", user.id);

    Ok(Json(SubmitResponse {
        success: true,
        submission_id,
    }))
}

/// GET /api/forms/submissions
pub async fn handle_list_submissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SubmissionsResponse>, AppError> {
    let submissions = sqlx::query_as::<_, FormSubmissionRow>(
        "SELECT * FROM form_submissions WHERE user_id = $1 ORDER BY submitted_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(SubmissionsResponse { submissions }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn save_request(step: i32) -> SaveProgressRequest {
        SaveProgressRequest {
            form_data: FormData::default(),
            current_step: step,
        }
    }

    #[test]
    fn test_current_step_bounds() {
        assert!(save_request(0).validate().is_err());
        assert!(save_request(1).validate().is_ok());
        assert!(save_request(5).validate().is_ok());
        assert!(save_request(6).validate().is_err());
    }

    #[test]
    fn test_save_request_reads_camel_case() {
        let req: SaveProgressRequest = serde_json::from_value(json!({
            "formData": { "fullName": "Linus", "yearsExperience": 3 },
            "currentStep": 2
        }))
        .unwrap();
        assert_eq!(req.current_step, 2);
        assert_eq!(req.form_data.full_name.as_deref(), Some("Linus"));
    }

    #[test]
    fn test_no_progress_response_shape() {
        let body = serde_json::to_value(ProgressResponse::from(None)).unwrap();
        assert_eq!(body, json!({ "hasProgress": false }));
    }

    #[test]
    fn test_progress_response_carries_step_and_data() {
        let row = FormProgressRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            form_data: json!({ "company": "Initech" }),
            current_step: 3,
            last_saved_at: Utc::now(),
            created_at: Utc::now(),
        };
        let body = serde_json::to_value(ProgressResponse::from(Some(row))).unwrap();
        assert_eq!(
            body,
            json!({ "hasProgress": true, "data": { "company": "Initech" }, "currentStep": 3 })
        );
    }
}
