//! Search result types.

use serde::{Deserialize, Serialize};

/// A single search hit.
///
/// `url` is the identity key: two results with the same `url` are the same
/// logical result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Result description/snippet. May be empty.
    #[serde(default)]
    pub description: String,
    /// Absolute http(s) URL.
    pub url: String,
}

impl SearchResult {
    /// Creates a new search result. An empty title is stored as `None`.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            title: if title.is_empty() { None } else { Some(title) },
            description: description.into(),
            url: url.into(),
        }
    }

    /// Creates a result without a title.
    pub fn untitled(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: description.into(),
            url: url.into(),
        }
    }

    /// Returns the title, or an empty string when absent.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Whether this result may be surfaced to callers.
    pub fn is_valid(&self) -> bool {
        is_absolute_http_url(&self.url)
    }
}

/// Returns true when `url` starts with an `http:` or `https:` scheme.
pub fn is_absolute_http_url(url: &str) -> bool {
    url.starts_with("http:") || url.starts_with("https:")
}
