//! Generic JSON-API search engine.
//!
//! Talks to any endpoint answering with a JSON array of
//! `{title, link|url, snippet|description}` records, or an object wrapping
//! that array under `items` or `results`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::JsonApiConfig;
use crate::fetcher::PageFetcher;
use crate::{Engine, EngineConfig, Result, SearchResult};

/// JSON-API search engine.
pub struct JsonApi {
    config: EngineConfig,
    endpoint: String,
    fetcher: Arc<dyn PageFetcher>,
}

impl JsonApi {
    /// Creates an engine for an endpoint template containing `{query}`.
    pub fn new(endpoint: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config: EngineConfig::new("JSON API", "api"),
            endpoint: endpoint.into(),
            fetcher,
        }
    }

    /// Creates an engine from its configuration section.
    pub fn from_config(settings: &JsonApiConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(settings.endpoint.clone(), fetcher)
            .with_config(EngineConfig::new(settings.name.clone(), "api"))
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    fn request_url(&self, term: &str) -> String {
        self.endpoint
            .replace("{query}", &urlencoding::encode(term))
    }

    fn parse_results(&self, json: &str) -> Result<Vec<SearchResult>> {
        let records = match serde_json::from_str::<ApiResponse>(json)? {
            ApiResponse::Records(records) => records,
            ApiResponse::Wrapped { items, results } => items.or(results).unwrap_or_default(),
        };

        let results = records
            .into_iter()
            .map(ApiRecord::into_result)
            .filter(SearchResult::is_valid)
            .collect();

        Ok(results)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Records(Vec<ApiRecord>),
    Wrapped {
        #[serde(default)]
        items: Option<Vec<ApiRecord>>,
        #[serde(default)]
        results: Option<Vec<ApiRecord>>,
    },
}

#[derive(Deserialize)]
struct ApiRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ApiRecord {
    fn into_result(self) -> SearchResult {
        SearchResult::new(
            self.link.or(self.url).unwrap_or_default(),
            self.title.unwrap_or_default(),
            self.snippet.or(self.description).unwrap_or_default(),
        )
    }
}

#[async_trait]
impl Engine for JsonApi {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn fetch(&self, term: &str) -> Result<String> {
        self.fetcher.fetch(&self.request_url(term)).await
    }

    fn extract(&self, raw: &str) -> Result<Vec<SearchResult>> {
        self.parse_results(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FixtureFetcher;
    use crate::SearchError;

    fn make_api() -> JsonApi {
        JsonApi::new(
            "https://api.test/search?q={query}&num=10",
            Arc::new(FixtureFetcher::new()),
        )
    }

    #[test]
    fn test_json_api_new() {
        let engine = make_api();
        assert_eq!(engine.name(), "JSON API");
        assert_eq!(engine.shortcut(), "api");
    }

    #[test]
    fn test_from_config() {
        let settings = JsonApiConfig {
            name: "Custom Search".into(),
            endpoint: "https://cse.test/?q={query}".into(),
        };
        let engine = JsonApi::from_config(&settings, Arc::new(FixtureFetcher::new()));
        assert_eq!(engine.name(), "Custom Search");
        assert_eq!(engine.request_url("a b"), "https://cse.test/?q=a%20b");
    }

    #[test]
    fn test_request_url() {
        assert_eq!(
            make_api().request_url("rust & c"),
            "https://api.test/search?q=rust%20%26%20c&num=10"
        );
    }

    #[test]
    fn test_extract_link_and_snippet() {
        let results = make_api()
            .extract(r#"[{"title":"T","link":"https://x.com","snippet":"S"}]"#)
            .unwrap();
        assert_eq!(results, vec![SearchResult::new("https://x.com", "T", "S")]);
    }

    #[test]
    fn test_extract_url_and_description() {
        let results = make_api()
            .extract(r#"[{"title":"T","url":"https://y.com","description":"D"}]"#)
            .unwrap();
        assert_eq!(results[0].url, "https://y.com");
        assert_eq!(results[0].description, "D");
    }

    #[test]
    fn test_extract_defaults_missing_fields() {
        let results = make_api().extract(r#"[{"link":"https://z.com"}]"#).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].title.is_none());
        assert_eq!(results[0].description, "");
    }

    #[test]
    fn test_extract_drops_records_without_url() {
        let results = make_api()
            .extract(r#"[{"title":"no link"},{"title":"bad","link":"mailto:a@b.c"}]"#)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_extract_wrapped_items() {
        let results = make_api()
            .extract(r#"{"kind":"customsearch#search","items":[{"title":"T","link":"https://x.com","snippet":"S"}]}"#)
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_extract_wrapped_results() {
        let results = make_api()
            .extract(r#"{"results":[{"title":"T","url":"https://x.com"}]}"#)
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_extract_empty_object() {
        assert!(make_api().extract("{}").unwrap().is_empty());
    }

    #[test]
    fn test_extract_malformed() {
        assert!(matches!(make_api().extract("not json"), Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_search_fetches_endpoint() {
        let fetcher = Arc::new(FixtureFetcher::new().with_fixture(
            "https://api.test/search",
            r#"[{"title":"T","link":"https://x.com","snippet":"S"}]"#,
        ));
        let engine = JsonApi::new("https://api.test/search?q={query}", fetcher.clone());
        let results = engine.search("rust").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(fetcher.requests(), vec!["https://api.test/search?q=rust".to_string()]);
    }
}
