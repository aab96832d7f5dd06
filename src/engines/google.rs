//! Google search engine implementation.
//!
//! Google result pages are walked structurally: the immediate `div` children
//! of `#main` are result blocks, preceded by a fixed number of chrome blocks
//! (ads, banners). Result links go through Google's `/url?q=` redirector.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::query_param;
use crate::config::GoogleConfig;
use crate::fetcher::PageFetcher;
use crate::result::is_absolute_http_url;
use crate::{Engine, EngineConfig, Result, SearchError, SearchResult};

/// Glyph left behind by mis-decoded text.
const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Google search engine.
pub struct Google {
    config: EngineConfig,
    settings: GoogleConfig,
    fetcher: Arc<dyn PageFetcher>,
}

impl Google {
    /// Creates a new Google engine with the given page fetcher.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config: EngineConfig::new("Google", "google"),
            settings: GoogleConfig::default(),
            fetcher,
        }
    }

    /// Replaces the provider settings (skip count, base URL).
    pub fn with_settings(mut self, settings: GoogleConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the number of leading `#main` blocks to skip.
    pub fn with_skip_blocks(mut self, skip_blocks: usize) -> Self {
        self.settings.skip_blocks = skip_blocks;
        self
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}/search?q={}",
            self.settings.base_url.trim_end_matches('/'),
            urlencoding::encode(term)
        )
    }

    fn parse_results(&self, html: &str) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);
        let main = result_container(&document)?;

        let link_selector = selector("a")?;
        let title_selector = selector("h3")?;

        let mut blocks = div_children(main)
            .skip(self.settings.skip_blocks)
            .skip_while(|block| element_children(*block).next().is_none())
            .peekable();

        if blocks.peek().is_none() {
            return Err(SearchError::Protocol(
                "no extractable block under #main".to_string(),
            ));
        }

        let mut results = Vec::new();
        for block in blocks {
            let Some(anchor) = block.select(&link_selector).next() else {
                continue;
            };
            let href = anchor.value().attr("href").unwrap_or_default();
            let Some(url) = redirect_target(href) else {
                debug!("skipping block with non-redirect link {}", href);
                continue;
            };
            if !is_absolute_http_url(&url) {
                continue;
            }

            let title = anchor
                .select(&title_selector)
                .next()
                .map(|h3| h3.text().collect::<String>())
                .filter(|t| !t.is_empty());

            results.push(SearchResult {
                title,
                description: trailing_text(block),
                url,
            });
        }

        Ok(results)
    }

    fn parse_text(&self, html: &str, show_url: bool) -> Result<String> {
        let document = Html::parse_document(html);
        let main = result_container(&document)?;

        let text = div_children(main)
            .map(|block| block_text(block, show_url))
            .collect::<Vec<_>>()
            .join("\n\n");

        let blank_runs = Regex::new(r"\n{2,}")
            .map_err(|e| SearchError::Parse(format!("Failed to compile regex: {e}")))?;
        Ok(blank_runs
            .replace_all(text.trim(), "\n\n")
            .replace(REPLACEMENT_CHAR, ""))
    }
}

#[async_trait]
impl Engine for Google {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn fetch(&self, term: &str) -> Result<String> {
        let html = self.fetcher.fetch(&self.search_url(term)).await?;

        if is_captcha_page(&html) {
            return Err(SearchError::Protocol(
                "Google returned a CAPTCHA page (bot detected)".to_string(),
            ));
        }

        Ok(html)
    }

    fn extract(&self, raw: &str) -> Result<Vec<SearchResult>> {
        self.parse_results(raw)
    }

    fn extract_text(&self, raw: &str, show_url: bool) -> Result<String> {
        self.parse_text(raw, show_url)
    }

    fn supports_text(&self) -> bool {
        true
    }
}

/// Marker returned by the prose walk when a subtree is internal navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Prune;

/// Renders one top-level block; a pruned block renders as nothing.
fn block_text(block: ElementRef<'_>, show_url: bool) -> String {
    element_text(block, show_url).unwrap_or_default()
}

fn element_text(element: ElementRef<'_>, show_url: bool) -> std::result::Result<String, Prune> {
    let href = element.value().attr("href");
    if href.is_some_and(|h| h.starts_with("/search")) {
        return Err(Prune);
    }

    let children: Vec<ElementRef<'_>> = element_children(element).collect();
    let text = if children.is_empty() {
        element.text().collect::<String>()
    } else {
        children
            .into_iter()
            .map(|child| element_text(child, show_url))
            .collect::<std::result::Result<Vec<_>, Prune>>()?
            .join("\n")
    };
    let text = text.trim();

    let target = href
        .filter(|h| h.starts_with("/url"))
        .map(|h| query_param(h, "q").unwrap_or_default());
    match target {
        Some(target) if show_url && !target.is_empty() => Ok(format!("{target}\n{text}")),
        _ => Ok(text.to_string()),
    }
}

/// A bot-check interstitial: no `#main`, plus a `/sorry/index` redirect or a reCAPTCHA widget.
fn is_captcha_page(html: &str) -> bool {
    if !html.contains("/sorry/index") && !html.contains("recaptcha") {
        return false;
    }
    let document = Html::parse_document(html);
    result_container(&document).is_err()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("Failed to parse selector: {:?}", e)))
}

fn result_container(document: &Html) -> Result<ElementRef<'_>> {
    let main_selector = selector("#main")?;
    document
        .select(&main_selector)
        .next()
        .ok_or_else(|| SearchError::Protocol("result container #main not found".to_string()))
}

fn element_children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn div_children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element_children(element).filter(|child| child.value().name() == "div")
}

/// Text of the last element inside the block's trailing child container.
fn trailing_text(block: ElementRef<'_>) -> String {
    let Some(container) = element_children(block).last() else {
        return String::new();
    };
    let inner = element_children(container).last().unwrap_or(container);
    inner
        .text()
        .collect::<String>()
        .replace(REPLACEMENT_CHAR, "")
        .trim()
        .to_string()
}

/// Decodes the destination of a Google-internal `/url` or `/search` link.
fn redirect_target(href: &str) -> Option<String> {
    if href.starts_with("/url") || href.starts_with("/search") {
        Some(query_param(href, "q").unwrap_or_default())
    } else {
        None
    }
}
