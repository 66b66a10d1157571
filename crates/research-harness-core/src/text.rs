//! Character-safe text helpers: prefix truncation and URL extraction.
//!
//! All lengths are counted in `char`s, never bytes, so multi-byte text
//! is never split inside a code point.

use regex::Regex;
use std::sync::OnceLock;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Return at most the first `max_chars` characters of `text`.
pub fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncate to `max_chars` characters, appending [`ELLIPSIS`] only when
/// something was cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    let cut = head(text, max_chars);
    if cut.len() < text.len() {
        format!("{}{}", cut, ELLIPSIS)
    } else {
        text.to_string()
    }
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https?://[A-Za-z0-9$%&'()*+,\-./:;<=>?@\[\\\]^_!]+")
            .expect("static URL pattern compiles")
    })
}

/// Find the first `http://` or `https://` URL in `text`.
///
/// The URL runs until the first whitespace, quote, brace, pipe, tilde or
/// backtick. Trailing punctuation is kept.
pub fn extract_first_url(text: &str) -> Option<&str> {
    url_pattern().find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_ascii() {
        assert_eq!(head("hello world", 5), "hello");
        assert_eq!(head("hi", 5), "hi");
        assert_eq!(head("", 5), "");
    }

    #[test]
    fn test_head_multibyte() {
        assert_eq!(head("héllo wörld", 7), "héllo w");
        assert_eq!(head("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_ellipsize_only_when_cut() {
        assert_eq!(ellipsize("short", 300), "short");
        let long = "x".repeat(301);
        let cut = ellipsize(&long, 300);
        assert_eq!(cut.chars().count(), 303);
        assert!(cut.ends_with("..."));
        assert_eq!(ellipsize(&"y".repeat(300), 300), "y".repeat(300));
    }

    #[test]
    fn test_extract_first_url() {
        assert_eq!(
            extract_first_url("Summarize this PDF: https://example.com/paper.pdf please"),
            Some("https://example.com/paper.pdf")
        );
        assert_eq!(
            extract_first_url("a http://a.io/x and https://b.io/y"),
            Some("http://a.io/x")
        );
        assert_eq!(
            extract_first_url("https://host/path?q=1&r=%20x#frag"),
            Some("https://host/path?q=1&r=%20x")
        );
    }

    #[test]
    fn test_extract_no_url() {
        assert_eq!(extract_first_url("summarize the document"), None);
        assert_eq!(extract_first_url("ftp://example.com/file.pdf"), None);
        assert_eq!(extract_first_url("https://"), None);
    }
}
