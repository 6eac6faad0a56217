use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::usage::ledger::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS};

/// Longest accepted rate-limit window: one week.
const MAX_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Trailing window for AI rate limiting, in seconds.
    pub rate_limit_window_secs: i64,
    pub rate_limit_max_requests: u32,
    /// Count in-flight AI requests against the limit (single-process only).
    pub rate_limit_strict: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)?,
            rate_limit_max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS)?,
            rate_limit_strict: env_or("RATE_LIMIT_STRICT", false)?,
        };
        validate_rate_limit(config.rate_limit_window_secs, config.rate_limit_max_requests)?;
        Ok(config)
    }
}

fn validate_rate_limit(window_secs: i64, max_requests: u32) -> Result<()> {
    if !(1..=MAX_WINDOW_SECS).contains(&window_secs) {
        bail!(
            "Environment variable 'RATE_LIMIT_WINDOW_SECS' must be between 1 and \
             {MAX_WINDOW_SECS}, got {window_secs}"
        );
    }
    if max_requests == 0 {
        bail!("Environment variable 'RATE_LIMIT_MAX_REQUESTS' must be at least 1");
    }
    Ok(())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let v: u32 = env_or("APPLICANT_API_TEST_UNSET_VARIABLE", 10).unwrap();
        assert_eq!(v, 10);
    }

    #[test]
    fn test_rate_limit_settings_must_be_usable() {
        assert!(validate_rate_limit(DEFAULT_WINDOW_SECS, DEFAULT_MAX_REQUESTS).is_ok());
        assert!(validate_rate_limit(MAX_WINDOW_SECS, 1).is_ok());

        for window in [0, -300, MAX_WINDOW_SECS + 1, i64::MAX] {
            let err = validate_rate_limit(window, 10).unwrap_err();
            assert!(err.to_string().contains("RATE_LIMIT_WINDOW_SECS"));
        }

        let err = validate_rate_limit(300, 0).unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_MAX_REQUESTS"));
    }

    #[test]
    fn test_env_or_parses_and_rejects() {
        std::env::set_var("APPLICANT_API_TEST_WINDOW", " 600 ");
        let v: i64 = env_or("APPLICANT_API_TEST_WINDOW", 300).unwrap();
        assert_eq!(v, 600);

        std::env::set_var("APPLICANT_API_TEST_STRICT", "yes");
        let err = env_or::<bool>("APPLICANT_API_TEST_STRICT", false).unwrap_err();
        assert!(err.to_string().contains("APPLICANT_API_TEST_STRICT"));
    }
}
