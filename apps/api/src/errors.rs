use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use crate::usage::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited {
        remaining: u32,
        reset_at: DateTime<Utc>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            // 429 carries the window state alongside the error
            AppError::RateLimited {
                remaining,
                reset_at,
            } => {
                let body = Json(json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": "Rate limit exceeded"
                    },
                    "remaining": remaining,
                    "resetAt": reset_at.to_rfc3339(),
                }));
                return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Usage data is temporarily unavailable".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_is_429_with_window_state() {
        let reset_at = DateTime::parse_from_rfc3339("2025-06-02T09:35:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let response = AppError::RateLimited {
            remaining: 0,
            reset_at,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
        assert_eq!(body["remaining"], 0);
        assert_eq!(body["resetAt"], "2025-06-02T09:35:00+00:00");
    }

    #[tokio::test]
    async fn test_storage_error_is_500_without_details() {
        let response =
            AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut)).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "STORAGE_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("pool"));
    }

    #[tokio::test]
    async fn test_validation_error_is_400_with_message() {
        let response = AppError::Validation("Text is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["message"], "Text is required");
    }
}
