//! Search engine implementations.

mod duckduckgo;
mod google;
mod json_api;

pub use duckduckgo::DuckDuckGo;
pub use google::Google;
pub use json_api::JsonApi;

/// Value of `key` in the query string following the last `?` of `href`.
pub(crate) fn query_param(href: &str, key: &str) -> Option<String> {
    let query = href.rsplit('?').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_after_last_question_mark() {
        assert_eq!(
            query_param("/url?q=https://a.com&sa=U", "q"),
            Some("https://a.com".to_string())
        );
        assert_eq!(query_param("/d.js?x=1?vqd=4-123", "vqd"), Some("4-123".to_string()));
    }

    #[test]
    fn test_query_param_decodes_values() {
        assert_eq!(
            query_param("?q=hello+world%21", "q"),
            Some("hello world!".to_string())
        );
    }

    #[test]
    fn test_query_param_missing() {
        assert_eq!(query_param("/url?sa=U", "q"), None);
        assert_eq!(query_param("", "q"), None);
    }

    #[test]
    fn test_query_param_without_question_mark_parses_whole_string() {
        assert_eq!(query_param("q=plain", "q"), Some("plain".to_string()));
    }
}
