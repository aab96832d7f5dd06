//! DuckDuckGo search engine implementation.
//!
//! Results come from the `links.duckduckgo.com/d.js` JSON endpoint, which
//! only answers when given a `vqd` token scraped from the regular search page.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use super::query_param;
use crate::config::DuckDuckGoConfig;
use crate::fetcher::PageFetcher;
use crate::query::{SafeSearch, TimeRange};
use crate::{Engine, EngineConfig, Result, SearchError, SearchResult};

const PAGE_URL: &str = "https://duckduckgo.com/";
const LINKS_URL: &str = "https://links.duckduckgo.com/d.js";

/// DuckDuckGo search engine.
pub struct DuckDuckGo {
    config: EngineConfig,
    settings: DuckDuckGoConfig,
    fetcher: Arc<dyn PageFetcher>,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo engine with the given page fetcher.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config: EngineConfig::new("DuckDuckGo", "ddg"),
            settings: DuckDuckGoConfig::default(),
            fetcher,
        }
    }

    /// Replaces the provider settings.
    pub fn with_settings(mut self, settings: DuckDuckGoConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the region code (e.g. `us-en`).
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.settings.region = region.into();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.settings.safesearch = level;
        self
    }

    /// Restricts results to a time range.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.settings.time_range = Some(range);
        self
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    fn page_url(&self, term: &str) -> String {
        let mut params = url::form_urlencoded::Serializer::new(String::new());
        params
            .append_pair("q", term)
            .append_pair("kl", &self.settings.region)
            .append_pair("p", &self.settings.safesearch.ddg_param().to_string());
        if let Some(range) = self.settings.time_range {
            params.append_pair("df", range.ddg_param());
        }
        format!("{PAGE_URL}?{}", params.finish())
    }

    fn links_url(&self, term: &str, vqd: &str) -> String {
        let region = &self.settings.region;
        let mut params = url::form_urlencoded::Serializer::new(String::new());
        params
            .append_pair("q", term)
            .append_pair("kl", region)
            .append_pair("l", region)
            .append_pair("bing_market", &bing_market(region))
            .append_pair("s", "0");
        if let Some(range) = self.settings.time_range {
            params.append_pair("df", range.ddg_param());
        }
        params
            .append_pair("vqd", vqd)
            .append_pair("o", "json")
            .append_pair("sp", "0");
        format!("{LINKS_URL}?{}", params.finish())
    }

    async fn handshake(&self, term: &str) -> Result<String> {
        let html = self.fetcher.fetch(&self.page_url(term)).await?;
        let vqd = extract_vqd(&html)?;
        debug!("DuckDuckGo vqd token acquired");
        self.fetcher.fetch(&self.links_url(term, &vqd)).await
    }

    fn parse_results(&self, json: &str) -> Result<Vec<SearchResult>> {
        let response: DdgResponse = serde_json::from_str(json)?;

        let results = response
            .results
            .into_iter()
            .map(|item| {
                let description = strip_html_tags(item.a.as_deref().unwrap_or_default());
                SearchResult::new(
                    item.u.unwrap_or_default(),
                    item.t.unwrap_or_default(),
                    description,
                )
            })
            .filter(SearchResult::is_valid)
            .collect();

        Ok(results)
    }
}

#[derive(Deserialize)]
struct DdgResponse {
    #[serde(default)]
    results: Vec<DdgItem>,
}

#[derive(Deserialize)]
struct DdgItem {
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    a: Option<String>,
    #[serde(default)]
    u: Option<String>,
}

#[async_trait]
impl Engine for DuckDuckGo {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn fetch(&self, term: &str) -> Result<String> {
        self.handshake(term)
            .await
            .map_err(|e| SearchError::Protocol(format!("DuckDuckGo request failed: {e}")))
    }

    fn extract(&self, raw: &str) -> Result<Vec<SearchResult>> {
        self.parse_results(raw)
    }
}

/// Scrapes the `vqd` token from the preload link or preload script, whichever carries it.
fn extract_vqd(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let candidates = [
        ("#deep_preload_link", "href"),
        ("#deep_preload_script", "src"),
    ];

    for (css, attr) in candidates {
        let selector = Selector::parse(css)
            .map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))?;
        let token = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .and_then(|link| query_param(link, "vqd"))
            .filter(|vqd| !vqd.is_empty());
        if let Some(vqd) = token {
            return Ok(vqd);
        }
    }

    Err(SearchError::Protocol("vqd token not found".to_string()))
}

/// `wt-wt` becomes `wt-WT`.
fn bing_market(region: &str) -> String {
    let lang = region.split('-').next().unwrap_or_default();
    let country = region.rsplit('-').next().unwrap_or_default();
    format!("{}-{}", lang, country.to_uppercase())
}

fn strip_html_tags(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FixtureFetcher;

    const PAGE_WITH_LINK: &str = r#"<html><head>
        <link id="deep_preload_link" rel="preload" as="script"
              href="https://links.duckduckgo.com/d.js?q=rust&amp;l=wt-wt&amp;vqd=4-1234567890&amp;p=-2">
        </head><body></body></html>"#;

    const PAGE_WITH_SCRIPT: &str = r#"<html><body>
        <script id="deep_preload_script" src="https://links.duckduckgo.com/d.js?q=rust&amp;vqd=4-999"></script>
        </body></html>"#;

    const RESULTS_JSON: &str = r#"{"results":[
        {"t":"Rust","a":"A language <b>empowering</b> everyone","u":"https://www.rust-lang.org/"},
        {"t":"Docs","a":"","u":"https://doc.rust-lang.org/"},
        {"n":"/d.js?q=rust&s=2"}
    ]}"#;

    fn make_ddg() -> DuckDuckGo {
        DuckDuckGo::new(Arc::new(FixtureFetcher::new()))
    }

    #[test]
    fn test_duckduckgo_new() {
        let engine = make_ddg();
        assert_eq!(engine.name(), "DuckDuckGo");
        assert_eq!(engine.shortcut(), "ddg");
        assert_eq!(engine.settings.region, "wt-wt");
        assert_eq!(engine.settings.safesearch, SafeSearch::Off);
        assert!(!engine.supports_text());
    }

    #[test]
    fn test_duckduckgo_with_config() {
        let engine = make_ddg().with_config(EngineConfig::new("Custom DDG", "cddg"));
        assert_eq!(engine.name(), "Custom DDG");
        assert_eq!(engine.shortcut(), "cddg");
    }

    #[test]
    fn test_page_url() {
        let engine = make_ddg();
        assert_eq!(
            engine.page_url("rust lang"),
            "https://duckduckgo.com/?q=rust+lang&kl=wt-wt&p=-2"
        );
    }

    #[test]
    fn test_page_url_with_safesearch_and_time_range() {
        let engine = make_ddg()
            .with_safesearch(SafeSearch::Strict)
            .with_time_range(TimeRange::Week);
        assert_eq!(
            engine.page_url("rust"),
            "https://duckduckgo.com/?q=rust&kl=wt-wt&p=1&df=w"
        );
    }

    #[test]
    fn test_links_url() {
        let engine = make_ddg().with_region("us-en");
        assert_eq!(
            engine.links_url("rust", "4-123"),
            "https://links.duckduckgo.com/d.js?q=rust&kl=us-en&l=us-en&bing_market=us-EN&s=0&vqd=4-123&o=json&sp=0"
        );
    }

    #[test]
    fn test_bing_market() {
        assert_eq!(bing_market("wt-wt"), "wt-WT");
        assert_eq!(bing_market("us-en"), "us-EN");
        assert_eq!(bing_market("xa"), "xa-XA");
    }

    #[test]
    fn test_extract_vqd_from_preload_link() {
        assert_eq!(extract_vqd(PAGE_WITH_LINK).unwrap(), "4-1234567890");
    }

    #[test]
    fn test_extract_vqd_from_preload_script() {
        assert_eq!(extract_vqd(PAGE_WITH_SCRIPT).unwrap(), "4-999");
    }

    #[test]
    fn test_extract_vqd_falls_back_when_link_has_no_token() {
        let html = r#"<html><head>
            <link id="deep_preload_link" href="https://links.duckduckgo.com/d.js?q=rust">
            </head><body>
            <script id="deep_preload_script" src="https://links.duckduckgo.com/d.js?vqd=4-42"></script>
            </body></html>"#;
        assert_eq!(extract_vqd(html).unwrap(), "4-42");
    }

    #[test]
    fn test_extract_vqd_missing() {
        let result = extract_vqd("<html><body>no token</body></html>");
        assert!(matches!(result, Err(SearchError::Protocol(_))));
    }

    #[test]
    fn test_extract_maps_fields() {
        let engine = make_ddg();
        let results = engine.extract(RESULTS_JSON).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("Rust"));
        assert_eq!(results[0].description, "A language empowering everyone");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[1].description, "");
    }

    #[test]
    fn test_extract_drops_non_http_urls() {
        let engine = make_ddg();
        let json = r#"{"results":[{"t":"x","a":"y","u":"/relative"},{"t":"z","a":"w"}]}"#;
        assert!(engine.extract(json).unwrap().is_empty());
    }

    #[test]
    fn test_extract_tolerates_null_fields() {
        let engine = make_ddg();
        let json = r#"{"results":[
            {"t":"Good","a":"x","u":"https://good.com"},
            {"t":null,"a":null,"u":"https://a.com"},
            {"t":"No url","a":"z","u":null}
        ]}"#;
        let results = engine.extract(json).unwrap();
        assert_eq!(
            results,
            vec![
                SearchResult::new("https://good.com", "Good", "x"),
                SearchResult::untitled("https://a.com", ""),
            ]
        );
    }

    #[test]
    fn test_extract_missing_results_key() {
        let engine = make_ddg();
        assert!(engine.extract("{}").unwrap().is_empty());
    }

    #[test]
    fn test_extract_malformed_json() {
        let engine = make_ddg();
        assert!(matches!(engine.extract("<html>"), Err(SearchError::Parse(_))));
    }

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html_tags("<b>bold</b> &amp; plain"), "bold & plain");
        assert_eq!(strip_html_tags(""), "");
    }

    #[tokio::test]
    async fn test_search_performs_handshake() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(LINKS_URL, RESULTS_JSON)
                .with_fixture(PAGE_URL, PAGE_WITH_LINK),
        );
        let engine = DuckDuckGo::new(fetcher.clone());
        let results = engine.search("rust").await.unwrap();
        assert_eq!(results.len(), 2);

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with(PAGE_URL));
        assert!(requests[1].starts_with(LINKS_URL));
        assert!(requests[1].contains("vqd=4-1234567890"));
    }

    #[tokio::test]
    async fn test_fetch_without_token_is_protocol_error() {
        let fetcher = Arc::new(
            FixtureFetcher::new()
                .with_fixture(LINKS_URL, RESULTS_JSON)
                .with_fixture(PAGE_URL, "<html></html>"),
        );
        let engine = DuckDuckGo::new(fetcher.clone());
        let result = engine.fetch("rust").await;
        assert!(matches!(result, Err(SearchError::Protocol(_))));
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_second_step_failure_is_protocol_error() {
        let fetcher = Arc::new(FixtureFetcher::new().with_fixture(PAGE_URL, PAGE_WITH_SCRIPT));
        let engine = DuckDuckGo::new(fetcher);
        let result = engine.fetch("rust").await;
        assert!(matches!(result, Err(SearchError::Protocol(_))));
    }
}
