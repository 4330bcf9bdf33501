use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Generation configuration loaded from environment variables.
///
/// Every field has a default; credentials are deliberately absent and arrive
/// with each request instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_base_url: String,
    pub gemini_base_url: String,
    /// Upper bound for a single provider round trip.
    pub request_timeout: Duration,
    /// Total attempts per request. `1` disables retries.
    pub retry_attempts: u32,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_attempts: 1,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = env_or("LLM_REQUEST_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("LLM_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        let retry_attempts = env_or("LLM_RETRY_ATTEMPTS", "1")
            .parse::<u32>()
            .context("LLM_RETRY_ATTEMPTS must be a non-negative integer")?;

        Ok(Config {
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            request_timeout: Duration::from_secs(timeout_secs),
            retry_attempts: retry_attempts.max(1),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
