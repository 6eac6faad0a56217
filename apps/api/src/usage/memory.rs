//! In-memory `UsageStore` for tests, with a switch that makes every call fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::usage::models::{UsageOutcome, UsageRecord};
use crate::usage::store::{StoreError, UsageStore};

#[derive(Default)]
pub struct MemoryUsageStore {
    records: Mutex<Vec<UsageRecord>>,
    failing: AtomicBool,
}

impl MemoryUsageStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn in_window(&self, user_id: Uuid, since: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.created_at >= since)
            .map(|r| r.created_at)
            .collect()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn insert(&self, record: &UsageRecord) -> Result<(), StoreError> {
        self.check()?;
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check()?;
        Ok(self.in_window(user_id, since).len() as u64)
    }

    async fn oldest_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.check()?;
        Ok(self.in_window(user_id, since).into_iter().min())
    }

    async fn outcomes(&self, user_id: Uuid) -> Result<Vec<UsageOutcome>, StoreError> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| UsageOutcome {
                total_tokens: u64::from(r.total_tokens),
                success: r.success,
            })
            .collect())
    }
}
