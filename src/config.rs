//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] holds the client identification presented to providers,
//! the retry budget, and per-provider tuning. Everything is immutable once
//! handed to [`Search`](crate::Search).

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::query::{SafeSearch, TimeRange};
use crate::{Result, SearchError};

/// Realistic desktop browser User-Agent presented on every outbound request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Client identification and transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// User-Agent header value.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Bounded re-attempt policy for a single query term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per term, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each later one. Zero retries immediately.
    pub base_delay_ms: u64,
    /// Upper bound for a single delay.
    pub max_delay_ms: u64,
    /// Add up to half the delay again, chosen at random.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 0,
            max_delay_ms: 2_000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Retries `max_attempts - 1` times with no delay.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter: false,
        }
    }

    /// Exponential backoff starting at `base_delay_ms`.
    pub fn exponential(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            jitter: true,
        }
    }

    /// Delay before attempt number `attempt` (1-based). The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.base_delay_ms == 0 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(16);
        let delay = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        let jitter = if self.jitter && delay > 1 {
            rand::thread_rng().gen_range(0..=delay / 2)
        } else {
            0
        };
        Duration::from_millis(delay + jitter)
    }
}

/// Markup-tree provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Leading `#main` blocks known to be page chrome.
    pub skip_blocks: usize,
    /// Scheme and host the search path is appended to.
    pub base_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            skip_blocks: 1,
            base_url: "https://www.google.com".to_string(),
        }
    }
}

/// Script-payload provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuckDuckGoConfig {
    /// Region code, e.g. `wt-wt` (no region) or `us-en`.
    pub region: String,
    pub safesearch: SafeSearch,
    pub time_range: Option<TimeRange>,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            region: "wt-wt".to_string(),
            safesearch: SafeSearch::Off,
            time_range: None,
        }
    }
}

/// JSON-API provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonApiConfig {
    /// Display name.
    #[serde(default = "default_json_api_name")]
    pub name: String,
    /// Endpoint template; `{query}` is replaced by the URL-encoded term.
    pub endpoint: String,
}

fn default_json_api_name() -> String {
    "JSON API".to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub client: ClientConfig,
    pub retry: RetryPolicy,
    pub google: GoogleConfig,
    pub duckduckgo: DuckDuckGoConfig,
    pub json_api: Option<JsonApiConfig>,
}

impl SearchConfig {
    /// Loads and validates a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("read {} failed: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parses and validates TOML configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(content)
            .map_err(|e| SearchError::Config(format!("parse TOML failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(SearchError::Config(
                "retry.max_attempts must be greater than 0".into(),
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(SearchError::Config(
                "retry.max_delay_ms must be >= retry.base_delay_ms".into(),
            ));
        }
        if self.client.timeout_secs == 0 {
            return Err(SearchError::Config(
                "client.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.client.user_agent.trim().is_empty() {
            return Err(SearchError::Config("client.user_agent must not be empty".into()));
        }
        if let Some(api) = &self.json_api {
            if !api.endpoint.contains("{query}") {
                return Err(SearchError::Config(
                    "json_api.endpoint must contain a {query} placeholder".into(),
                ));
            }
        }
        Ok(())
    }
}
