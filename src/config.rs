use crate::error::{ClientError, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const API_URL_VAR: &str = "API_URL";
const TIMEOUT_VAR: &str = "API_TIMEOUT_SECS";

/// Process-wide client settings, resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    /// Connect limit for every call, total limit for JSON calls only.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("{} must be a number of seconds, got '{}'", TIMEOUT_VAR, raw))
            })?;
        }

        Ok(config)
    }

    /// Link to a file stored by the analysis service.
    pub fn uploads_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}", self.api_url, filename)
    }
}
