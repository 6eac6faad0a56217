use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The AI feature an attempt was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Autofill,
    Improve,
    Expand,
    Validate,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Autofill => "autofill",
            FeatureType::Improve => "improve",
            FeatureType::Expand => "expand",
            FeatureType::Validate => "validate",
        }
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row per attempted AI operation. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feature_type: FeatureType,
    /// Prompt-side tokens are not separated from the response side; always 0.
    pub request_tokens: u32,
    pub response_tokens: u32,
    pub total_tokens: u32,
    pub success: bool,
    /// Only present when `success` is false.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(
        user_id: Uuid,
        feature_type: FeatureType,
        tokens_used: u32,
        success: bool,
        error_message: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            feature_type,
            request_tokens: 0,
            response_tokens: tokens_used,
            total_tokens: tokens_used,
            success,
            error_message: if success { None } else { error_message },
            created_at,
        }
    }
}

/// The subset of a ledger row the stats aggregator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageOutcome {
    pub total_tokens: u64,
    pub success: bool,
}

/// Allow/deny decision for a user's next AI attempt. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub total_used: u32,
}

impl RateLimitDecision {
    /// Builds the decision from the in-window count and the oldest in-window timestamp.
    pub fn compute(
        total_used: u32,
        capacity: u32,
        oldest_in_window: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        let reset_at = match oldest_in_window {
            Some(oldest) => oldest + window,
            None => now + window,
        };
        Self {
            allowed: total_used < capacity,
            remaining: capacity.saturating_sub(total_used),
            reset_at,
            total_used,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_requests: u64,
    pub total_tokens: u64,
    /// Percentage in `0.0..=100.0`; 100 when the user has no history.
    pub success_rate: f64,
    pub recent_requests: u64,
}

impl UsageStats {
    pub fn summarize(outcomes: &[UsageOutcome], recent_requests: u64) -> Self {
        let total_requests = outcomes.len() as u64;
        let total_tokens = outcomes.iter().map(|o| o.total_tokens).sum();
        let successful = outcomes.iter().filter(|o| o.success).count() as u64;
        let success_rate = if total_requests > 0 {
            successful as f64 / total_requests as f64 * 100.0
        } else {
            100.0
        };

        Self {
            total_requests,
            total_tokens,
            success_rate,
            recent_requests,
        }
    }
}
