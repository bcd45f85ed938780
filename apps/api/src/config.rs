use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::matching::cache::DEFAULT_TTL;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the job-board REST backend, e.g. `http://localhost:8081/api`.
    pub scoring_api_url: String,
    pub scoring_api_token: Option<String>,
    pub scoring_timeout: Duration,
    pub recommendation_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let recommendation_ttl = Duration::from_secs(parse_env(
            "RECOMMENDATION_TTL_SECS",
            DEFAULT_TTL.as_secs(),
        )?);
        if recommendation_ttl.is_zero() {
            bail!("RECOMMENDATION_TTL_SECS must be greater than zero");
        }

        Ok(Config {
            scoring_api_url: require_env("SCORING_API_URL")?,
            scoring_api_token: std::env::var("SCORING_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            scoring_timeout: Duration::from_secs(parse_env(
                "SCORING_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            recommendation_ttl,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
