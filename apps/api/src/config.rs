use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::session::SessionSettings;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scoring_debounce_ms: u64,
    pub autosave_debounce_ms: u64,
    /// JSON file store root. In-memory storage when unset.
    pub resume_store_dir: Option<PathBuf>,
    /// Remote resume backend. Optimization falls back to local scoring when unset.
    pub remote_api_url: Option<String>,
    pub remote_timeout_secs: u64,
    pub remote_retry_attempts: u32,
    /// First retry delay; each later retry doubles it.
    pub remote_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scoring_debounce_ms: parse_or(&lookup, "SCORING_DEBOUNCE_MS", 1000)?,
            autosave_debounce_ms: parse_or(&lookup, "AUTOSAVE_DEBOUNCE_MS", 1500)?,
            resume_store_dir: non_empty(&lookup, "RESUME_STORE_DIR").map(PathBuf::from),
            remote_api_url: non_empty(&lookup, "REMOTE_API_URL"),
            remote_timeout_secs: parse_or(&lookup, "REMOTE_TIMEOUT_SECS", 30)?,
            remote_retry_attempts: parse_or(&lookup, "REMOTE_RETRY_ATTEMPTS", 3)?,
            remote_backoff_ms: parse_or(&lookup, "REMOTE_BACKOFF_MS", 1000)?,
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            scoring_debounce: Duration::from_millis(self.scoring_debounce_ms),
            autosave_debounce: Duration::from_millis(self.autosave_debounce_ms),
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn remote_backoff(&self) -> Duration {
        Duration::from_millis(self.remote_backoff_ms)
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
