//! Usage ledger: rate gate, usage tracker and stats aggregator.
//!
//! Flow for every AI-backed request:
//!   admit (gate) → AI call → track exactly once (success or failure).
//!
//! By default the gate and the tracker are two independent operations: two concurrent
//! requests from one user can both pass the gate before either is recorded, so the
//! capacity can be briefly exceeded. `RateLimitPolicy::strict` closes that race inside
//! this process with in-flight permits (see `permits`).

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::usage::clock::Clock;
use crate::usage::models::{FeatureType, RateLimitDecision, UsageRecord, UsageStats};
use crate::usage::permits::{InFlight, InFlightPermit};
use crate::usage::store::{StoreError, UsageStore};

pub const DEFAULT_WINDOW_SECS: i64 = 5 * 60;
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    /// Length of the trailing window `[now - window, now]`.
    pub window: Duration,
    /// Attempts allowed per window.
    pub capacity: u32,
    /// Count in-flight admissions against the capacity.
    pub strict: bool,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: Duration::seconds(DEFAULT_WINDOW_SECS),
            capacity: DEFAULT_MAX_REQUESTS,
            strict: false,
        }
    }
}

/// Result of `UsageLedger::admit`. Keep `permit` alive until the attempt is tracked.
#[derive(Debug)]
pub struct Admission {
    pub decision: RateLimitDecision,
    pub permit: Option<InFlightPermit>,
}

pub struct UsageLedger {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    in_flight: InFlight,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn UsageStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            in_flight: InFlight::default(),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Read-only decision for the user's next attempt. Storage errors propagate;
    /// the caller decides whether to fail open or closed.
    pub async fn check_rate_limit(&self, user_id: Uuid) -> Result<RateLimitDecision, StoreError> {
        self.decide(user_id, 0).await
    }

    /// Gate check used by request handlers. In strict mode an allowed admission also
    /// reserves an in-flight slot, taken under the user's admission lock with the check.
    pub async fn admit(&self, user_id: Uuid) -> Result<Admission, StoreError> {
        let admission = if self.policy.strict {
            let _guard = self.in_flight.admission_lock(user_id).await;
            let decision = self.decide(user_id, self.in_flight.count(user_id)).await?;
            let permit = decision
                .allowed
                .then(|| self.in_flight.reserve(user_id));
            Admission { decision, permit }
        } else {
            Admission {
                decision: self.check_rate_limit(user_id).await?,
                permit: None,
            }
        };

        if !admission.decision.allowed {
            info!(
                "Rate limit reached for user {user_id}: {} used, resets at {}",
                admission.decision.total_used, admission.decision.reset_at
            );
        }
        Ok(admission)
    }

    async fn decide(&self, user_id: Uuid, in_flight: u32) -> Result<RateLimitDecision, StoreError> {
        let now = self.clock.now();
        let since = now - self.policy.window;

        let count = self.store.count_since(user_id, since).await?;
        let oldest = self.store.oldest_since(user_id, since).await?;
        let total_used = u32::try_from(count)
            .unwrap_or(u32::MAX)
            .saturating_add(in_flight);

        Ok(RateLimitDecision::compute(
            total_used,
            self.policy.capacity,
            oldest,
            now,
            self.policy.window,
        ))
    }

    /// Appends one usage record. Best-effort: a failed write is logged and swallowed.
    pub async fn track_ai_usage(
        &self,
        user_id: Uuid,
        feature_type: FeatureType,
        tokens_used: u32,
        success: bool,
        error_message: Option<String>,
    ) {
        let record = UsageRecord::new(
            user_id,
            feature_type,
            tokens_used,
            success,
            error_message,
            self.clock.now(),
        );

        if let Err(e) = self.store.insert(&record).await {
            error!("Failed to track AI usage for user {user_id} ({feature_type}): {e}");
        }
    }

    /// Runs one AI attempt and tracks its outcome exactly once: the reported token
    /// count on success, 0 tokens and the error text on failure.
    pub async fn tracked<T, E, F>(
        &self,
        user_id: Uuid,
        feature_type: FeatureType,
        attempt: F,
    ) -> Result<(T, u32), E>
    where
        F: Future<Output = Result<(T, u32), E>>,
        E: Display,
    {
        match attempt.await {
            Ok((value, tokens_used)) => {
                self.track_ai_usage(user_id, feature_type, tokens_used, true, None)
                    .await;
                Ok((value, tokens_used))
            }
            Err(e) => {
                self.track_ai_usage(user_id, feature_type, 0, false, Some(e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    /// All-time totals plus the number of attempts in the current window.
    pub async fn get_ai_usage_stats(&self, user_id: Uuid) -> Result<UsageStats, StoreError> {
        let outcomes = self.store.outcomes(user_id).await?;
        let since = self.clock.now() - self.policy.window;
        let recent_requests = self.store.count_since(user_id, since).await?;
        Ok(UsageStats::summarize(&outcomes, recent_requests))
    }
}
