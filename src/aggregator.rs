//! Result deduplication and text summaries.

use std::collections::{HashMap, HashSet};

use crate::SearchResult;

/// Deduplicates results by URL.
///
/// Each URL keeps the position where it was first seen, but the content of
/// the last result carrying that URL.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(results.len());
    let mut merged: Vec<SearchResult> = Vec::with_capacity(results.len());

    for result in results {
        match positions.get(&result.url) {
            Some(&index) => merged[index] = result,
            None => {
                positions.insert(result.url.clone(), merged.len());
                merged.push(result);
            }
        }
    }

    merged
}

/// Renders one result as up to three lines: URL (when `show_url`), title
/// (when present and non-empty), description.
pub fn render_block(result: &SearchResult, show_url: bool) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(3);
    if show_url {
        lines.push(&result.url);
    }
    if let Some(title) = result.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(title);
    }
    lines.push(&result.description);
    lines.join("\n")
}

/// Deduplicates and renders results as blank-line separated blocks.
///
/// Blocks rendering to identical text collapse into one even when their URLs
/// differ. An empty input yields an empty string.
pub fn summarize(results: Vec<SearchResult>, show_url: bool) -> String {
    let mut seen = HashSet::new();
    deduplicate(results)
        .iter()
        .map(|result| render_block(result, show_url))
        .filter(|block| seen.insert(block.clone()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, title: &str, description: &str) -> SearchResult {
        SearchResult::new(url, title, description)
    }

    #[test]
    fn test_deduplicate_empty() {
        assert!(deduplicate(vec![]).is_empty());
    }

    #[test]
    fn test_deduplicate_later_overwrites_earlier() {
        let deduped = deduplicate(vec![
            result("https://a.com", "A", "d1"),
            result("https://a.com", "A2", "d2"),
        ]);
        assert_eq!(deduped, vec![result("https://a.com", "A2", "d2")]);
    }

    #[test]
    fn test_deduplicate_keeps_first_seen_position() {
        let deduped = deduplicate(vec![
            result("https://a.com", "A", "first"),
            result("https://b.com", "B", "b"),
            result("https://a.com", "A", "last"),
            result("https://c.com", "C", "c"),
        ]);
        let urls: Vec<_> = deduped.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
        assert_eq!(deduped[0].description, "last");
    }

    #[test]
    fn test_deduplicate_is_exact_on_url() {
        let deduped = deduplicate(vec![
            result("https://a.com", "A", ""),
            result("https://a.com/", "A", ""),
            result("http://a.com", "A", ""),
        ]);
        assert_eq!(deduped.len(), 3);
    }

    #[test]
    fn test_deduplicate_idempotent() {
        let input = vec![
            result("https://a.com", "A", "1"),
            result("https://b.com", "B", "2"),
            result("https://a.com", "A", "3"),
            result("https://b.com", "", "4"),
            result("https://c.com", "C", "5"),
        ];
        let once = deduplicate(input);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_render_block_all_lines() {
        let block = render_block(&result("https://a.com", "A", "d"), true);
        assert_eq!(block, "https://a.com\nA\nd");
    }

    #[test]
    fn test_render_block_without_title() {
        let block = render_block(&SearchResult::untitled("https://a.com", "d"), true);
        assert_eq!(block, "https://a.com\nd");
    }

    #[test]
    fn test_render_block_with_empty_title_string() {
        let mut item = result("https://a.com", "", "d");
        item.title = Some(String::new());
        assert_eq!(render_block(&item, false), "d");
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(vec![], true), "");
        assert_eq!(summarize(vec![], false), "");
    }

    #[test]
    fn test_summarize_without_url() {
        let summary = summarize(vec![result("https://a.com", "A", "d")], false);
        assert_eq!(summary, "A\nd");
    }

    #[test]
    fn test_summarize_joins_blocks_with_blank_line() {
        let summary = summarize(
            vec![
                result("https://a.com", "A", "da"),
                result("https://b.com", "B", "db"),
            ],
            true,
        );
        assert_eq!(summary, "https://a.com\nA\nda\n\nhttps://b.com\nB\ndb");
    }

    #[test]
    fn test_summarize_collapses_identical_blocks() {
        let items = vec![
            result("https://a.com", "Same", "same"),
            result("https://b.com", "Same", "same"),
            result("https://c.com", "Other", "other"),
        ];
        assert_eq!(summarize(items.clone(), false), "Same\nsame\n\nOther\nother");
        assert_eq!(summarize(items, true).matches("\n\n").count(), 2);
    }

    #[test]
    fn test_summarize_uses_last_write() {
        let summary = summarize(
            vec![
                result("https://a.com", "A", "old"),
                result("https://b.com", "B", "b"),
                result("https://a.com", "A", "new"),
            ],
            false,
        );
        assert_eq!(summary, "A\nnew\n\nB\nb");
    }
}
