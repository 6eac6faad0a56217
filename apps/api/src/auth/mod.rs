//! Session identity for request handlers.
//!
//! Sessions are issued by the magic-link login flow, which stores only the SHA-256
//! hex digest of each token. This module resolves the `session_token` cookie back
//! to its user.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tower_cookies::Cookies;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Hashes a session token the way it is stored in `sessions.token`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Returns the user behind an unexpired session, touching `last_activity`.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<User>, AppError> {
    let hashed = hash_token(token);

    let user: Option<User> = sqlx::query_as(
        r#"
        SELECT u.id, u.email, u.created_at, u.updated_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(&hashed)
    .fetch_optional(pool)
    .await?;

    if user.is_some() {
        sqlx::query("UPDATE sessions SET last_activity = NOW() WHERE token = $1")
            .bind(&hashed)
            .execute(pool)
            .await?;
    }

    Ok(user)
}

/// Extractor for the authenticated user. Rejects with 401 when the session cookie
/// is missing, unknown or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let token = cookies
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        validate_session(&state.db, &token)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_token_is_stable_and_distinct() {
        let token = "3f".repeat(32);
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), hash_token("other"));
        assert_eq!(hash_token(&token).len(), 64);
    }
}
