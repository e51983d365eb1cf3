//! Search query normalization and URL construction.
//!
//! Display text goes in, a browser-ready URL comes out. Launching the
//! browser is the caller's job (fire-and-forget via the OS opener); this
//! module never blocks on anything.

use std::fmt;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Placeholder the URL template must contain.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// A configured search engine: display name plus a URL template with a
/// `{query}` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEngine {
    pub name: String,
    pub url_template: String,
}

impl SearchEngine {
    pub fn new(name: &str, url_template: &str) -> Self {
        SearchEngine {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// Nothing left after normalization; no browser action is taken.
    EmptyQuery,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::EmptyQuery => write!(f, "empty cells cannot be searched"),
        }
    }
}

/// Clean display text for use as a query, in order: collapse whitespace
/// runs (including CR/LF and the full-width space U+3000) to single spaces,
/// drop control characters, trim the edges.
pub fn normalize_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.chars() {
        // U+3000 satisfies is_whitespace, as do \r and \n
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
        } else if ch.is_control() {
            // structurally meaningless in a query
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Build the search URL for `text` against `engine`.
///
/// Fails with `EmptyQuery` when normalization leaves nothing. The query is
/// percent-encoded with every non-alphanumeric byte escaped, then
/// substituted into the engine's template.
pub fn build_search_url(engine: &SearchEngine, text: &str) -> Result<String, QueryError> {
    let query = normalize_query(text);
    if query.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    let encoded = utf8_percent_encode(&query, NON_ALPHANUMERIC).to_string();
    Ok(engine.url_template.replace(QUERY_PLACEHOLDER, &encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SearchEngine {
        SearchEngine::new("Test", "https://example.com/search?q={query}")
    }

    #[test]
    fn trims_and_collapses_whitespace() {
        assert_eq!(normalize_query("  New   York "), "New York");
    }

    #[test]
    fn fullwidth_space_collapses_like_ascii() {
        assert_eq!(normalize_query("東京　　大阪"), "東京 大阪");
    }

    #[test]
    fn newlines_become_single_spaces() {
        assert_eq!(normalize_query("a\r\nb\nc"), "a b c");
    }

    #[test]
    fn control_chars_stripped() {
        assert_eq!(normalize_query("a\u{0007}b\u{001b}c"), "abc");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(normalize_query("   "), "");
        assert_eq!(normalize_query("\u{3000}\n\r"), "");
    }

    #[test]
    fn empty_query_is_an_error() {
        assert_eq!(build_search_url(&engine(), "   "), Err(QueryError::EmptyQuery));
        assert_eq!(build_search_url(&engine(), ""), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn query_is_percent_encoded() {
        let url = build_search_url(&engine(), "  New   York ").unwrap();
        assert_eq!(url, "https://example.com/search?q=New%20York");
    }

    #[test]
    fn reserved_chars_fully_escaped() {
        let url = build_search_url(&engine(), "a&b=c").unwrap();
        assert_eq!(url, "https://example.com/search?q=a%26b%3Dc");
    }

    #[test]
    fn multibyte_query_encoded() {
        let url = build_search_url(&engine(), "東京").unwrap();
        assert_eq!(url, "https://example.com/search?q=%E6%9D%B1%E4%BA%AC");
    }
}
