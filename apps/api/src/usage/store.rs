//! Persistence seam for the usage ledger.
//!
//! `UsageLedger` only talks to `dyn UsageStore`. `PgUsageStore` is the production
//! backend over the `ai_usage` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::usage::models::{UsageOutcome, UsageRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("usage ledger database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Appends one record. Records are never updated afterwards.
    async fn insert(&self, record: &UsageRecord) -> Result<(), StoreError>;

    /// Counts the user's records with `created_at >= since`.
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<u64, StoreError>;

    /// `created_at` of the user's oldest record with `created_at >= since`.
    async fn oldest_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Token totals and outcomes across the user's whole history.
    async fn outcomes(&self, user_id: Uuid) -> Result<Vec<UsageOutcome>, StoreError>;
}

pub struct PgUsageStore {
    pool: PgPool,
}

impl PgUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn insert(&self, record: &UsageRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ai_usage
                (id, user_id, feature_type, request_tokens, response_tokens,
                 total_tokens, success, error_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.feature_type.as_str())
        .bind(i64::from(record.request_tokens))
        .bind(i64::from(record.response_tokens))
        .bind(i64::from(record.total_tokens))
        .bind(record.success)
        .bind(record.error_message.as_deref())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ai_usage WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn oldest_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let oldest: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT created_at FROM ai_usage
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;
        Ok(oldest)
    }

    async fn outcomes(&self, user_id: Uuid) -> Result<Vec<UsageOutcome>, StoreError> {
        let rows: Vec<(i64, bool)> =
            sqlx::query_as("SELECT total_tokens, success FROM ai_usage WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(total_tokens, success)| UsageOutcome {
                total_tokens: total_tokens.max(0) as u64,
                success,
            })
            .collect())
    }
}
