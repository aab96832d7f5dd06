//! Search engine trait and provider selection.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, SearchError, SearchResult};

/// Provider selector used at the call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Markup-tree provider (Google result pages).
    Google,
    /// Script-payload provider (DuckDuckGo handshake + JSON).
    #[serde(rename = "ddg")]
    DuckDuckGo,
    /// Generic JSON-API provider.
    #[serde(rename = "api")]
    JsonApi,
}

impl ProviderKind {
    /// All selectable providers.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Google,
        ProviderKind::DuckDuckGo,
        ProviderKind::JsonApi,
    ];

    /// Short identifier, also used in route names.
    pub fn shortcut(self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::DuckDuckGo => "ddg",
            ProviderKind::JsonApi => "api",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shortcut())
    }
}

impl FromStr for ProviderKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" | "g" => Ok(ProviderKind::Google),
            "ddg" | "duckduckgo" => Ok(ProviderKind::DuckDuckGo),
            "api" | "json" | "json_api" => Ok(ProviderKind::JsonApi),
            other => Err(SearchError::Config(format!("unknown provider '{other}'"))),
        }
    }
}

/// Configuration for a search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the engine.
    pub name: String,
    /// Short identifier (e.g., "ddg" for DuckDuckGo).
    pub shortcut: String,
}

impl EngineConfig {
    pub fn new(name: impl Into<String>, shortcut: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: shortcut.into(),
        }
    }
}

/// Trait for implementing search engines.
///
/// An engine is a `fetch`/`extract` pair: `fetch` performs all I/O needed to
/// obtain the raw provider response for one term, `extract` turns that raw
/// response into results without any I/O. Every result returned by `extract`
/// must carry an absolute http(s) URL.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the engine configuration.
    fn config(&self) -> &EngineConfig;

    /// Fetches the raw response for a single query term.
    async fn fetch(&self, term: &str) -> Result<String>;

    /// Extracts results from a raw response.
    fn extract(&self, raw: &str) -> Result<Vec<SearchResult>>;

    /// Renders a raw response as flattened prose.
    fn extract_text(&self, _raw: &str, _show_url: bool) -> Result<String> {
        Err(SearchError::Unsupported(format!(
            "engine '{}' has no text digest",
            self.name()
        )))
    }

    /// Whether `extract_text` is implemented.
    fn supports_text(&self) -> bool {
        false
    }

    /// One attempt: fetch then extract.
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>> {
        let raw = self.fetch(term).await?;
        self.extract(&raw)
    }

    /// Returns the engine name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the engine shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }
}
