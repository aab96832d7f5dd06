//! Search orchestration.
//!
//! [`Search`] fans a set of query terms out to one engine, retries each term
//! on its own, and merges whatever came back. It never fails: a term that
//! exhausts its retry budget contributes nothing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::{RetryPolicy, SearchConfig};
use crate::engines::{DuckDuckGo, Google, JsonApi};
use crate::fetcher::PageFetcher;
use crate::fetcher_http::HttpFetcher;
use crate::{aggregator, Engine, ProviderKind, QueryTerms, Result, SearchResult};

/// Separator between per-term prose digests.
pub const DIGEST_SEPARATOR: &str = "\n\n---\n\n";

/// Search orchestrator holding one engine per provider.
pub struct Search {
    engines: HashMap<ProviderKind, Arc<dyn Engine>>,
    retry: RetryPolicy,
}

impl Search {
    /// Creates a search instance with no engines and the default retry policy.
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a search instance with every configured provider, talking HTTP.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.client)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Creates a search instance with every configured provider sharing `fetcher`.
    pub fn with_fetcher(config: &SearchConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let mut search = Self::new();
        search.set_retry_policy(config.retry.clone());
        search.add_engine(
            ProviderKind::Google,
            Google::new(Arc::clone(&fetcher)).with_settings(config.google.clone()),
        );
        search.add_engine(
            ProviderKind::DuckDuckGo,
            DuckDuckGo::new(Arc::clone(&fetcher)).with_settings(config.duckduckgo.clone()),
        );
        if let Some(api) = &config.json_api {
            search.add_engine(ProviderKind::JsonApi, JsonApi::from_config(api, fetcher));
        }
        search
    }

    /// Registers the engine serving `kind`, replacing any previous one.
    pub fn add_engine<E: Engine + 'static>(&mut self, kind: ProviderKind, engine: E) {
        self.engines.insert(kind, Arc::new(engine));
    }

    /// Sets the per-term retry policy.
    pub fn set_retry_policy(&mut self, retry: RetryPolicy) {
        self.retry = retry;
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns the engine registered for `kind`.
    pub fn engine(&self, kind: ProviderKind) -> Option<&Arc<dyn Engine>> {
        self.engines.get(&kind)
    }

    /// Returns the number of configured engines.
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Structured results for `terms` from the provider `kind`.
    pub async fn search(&self, kind: ProviderKind, terms: &QueryTerms) -> Vec<SearchResult> {
        match self.engine(kind) {
            Some(engine) => self.run(engine.as_ref(), terms).await,
            None => {
                warn!("No engine registered for provider {}", kind);
                Vec::new()
            }
        }
    }

    /// Deduplicated text summary for `terms` from the provider `kind`.
    pub async fn summary(&self, kind: ProviderKind, show_url: bool, terms: &QueryTerms) -> String {
        aggregator::summarize(self.search(kind, terms).await, show_url)
    }

    /// Prose digest of each term's raw result page, joined with [`DIGEST_SEPARATOR`].
    pub async fn digest(&self, kind: ProviderKind, show_url: bool, terms: &QueryTerms) -> String {
        let Some(engine) = self.engine(kind) else {
            warn!("No engine registered for provider {}", kind);
            return String::new();
        };
        if !engine.supports_text() {
            warn!("Engine {} has no text digest", engine.name());
            return String::new();
        }

        let engine = engine.as_ref();
        let digests = join_all(terms.iter().map(|term| {
            self.with_retry(engine.name(), term, move || async move {
                let raw = engine.fetch(term).await?;
                engine.extract_text(&raw, show_url)
            })
        }))
        .await;

        digests
            .into_iter()
            .flatten()
            .filter(|digest| !digest.is_empty())
            .collect::<Vec<_>>()
            .join(DIGEST_SEPARATOR)
    }

    /// Runs every term against `engine` concurrently.
    ///
    /// Attempts for one term are sequential; terms run concurrently. Output
    /// is concatenated in term order regardless of completion order.
    pub async fn run(&self, engine: &dyn Engine, terms: &QueryTerms) -> Vec<SearchResult> {
        let per_term = join_all(
            terms
                .iter()
                .map(|term| self.with_retry(engine.name(), term, move || engine.search(term))),
        )
        .await;

        per_term.into_iter().flatten().flatten().collect()
    }

    async fn with_retry<T, F, Fut>(&self, engine: &str, term: &str, mut attempt_fn: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for attempt in 1..=self.retry.max_attempts {
            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match attempt_fn().await {
                Ok(value) => {
                    debug!("Engine {} answered '{}' on attempt {}", engine, term, attempt);
                    return Some(value);
                }
                Err(e) => {
                    warn!(
                        engine,
                        term,
                        attempt,
                        retryable = e.is_retryable(),
                        "Attempt failed: {}",
                        e
                    );
                }
            }
        }

        warn!(
            "Engine {} gave up on '{}' after {} attempts",
            engine, term, self.retry.max_attempts
        );
        None
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}
