//! Page fetcher abstraction for retrieving raw provider responses.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Result, SearchError};

/// Trait for fetching the body of a URL.
///
/// All configuration (user-agent, timeouts) is set at construction time;
/// `fetch` is a simple URL-in, body-out interface.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the body of the given URL.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// A fetcher serving canned bodies keyed by URL prefix.
///
/// Requests are recorded in order so callers can assert on the exact URLs an
/// engine produced. A URL matching no fixture fails with a protocol error.
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    fixtures: Vec<(String, String)>,
    requests: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for every URL starting with `prefix`. Earlier fixtures win.
    pub fn with_fixture(mut self, prefix: impl Into<String>, body: impl Into<String>) -> Self {
        self.fixtures.push((prefix.into(), body.into()));
        self
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.fixtures
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| SearchError::Protocol(format!("no fixture for {url}")))
    }
}
