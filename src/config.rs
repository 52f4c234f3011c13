//! Runtime settings loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::collab::quotable::DEFAULT_QUOTE_URL;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub quote_url: String,
    pub http_timeout: Duration,
    pub ytdlp_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quote_url: DEFAULT_QUOTE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            ytdlp_path: None,
            seed: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load from process environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("TOYBOX_QUOTE_URL") {
            config.quote_url = url;
        }

        if let Some(raw) = lookup("TOYBOX_HTTP_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "TOYBOX_HTTP_TIMEOUT_SECS",
                        format!("'{raw}' is not a positive number of seconds"),
                    )
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        config.ytdlp_path = lookup("TOYBOX_YTDLP")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup("TOYBOX_SEED") {
            let seed = raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue("TOYBOX_SEED", format!("'{raw}' is not a u64"))
            })?;
            config.seed = Some(seed);
        }

        if let Some(filter) = lookup("TOYBOX_LOG").or_else(|| lookup("RUST_LOG")) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}
