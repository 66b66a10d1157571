//! Keyword-based tool selection.
//!
//! Keyword sets are tested in priority order against the case-folded
//! question; the first set with a substring hit wins.
//!
//! | Priority | Keywords | Tool |
//! |----------|----------|------|
//! | 1 | `pdf`, `document`, `summarize`, `file` | [`ToolChoice::PdfSummarize`] |
//! | 2 | `search`, `web`, `current`, `news`, `recent`, `latest` | [`ToolChoice::WebSearch`] |
//! | 3 | anything else | [`ToolChoice::MemoryLookup`] |
//!
//! Matching is by substring, so `"files"` and `"websites"` also match.

use crate::models::ToolChoice;

pub const PDF_KEYWORDS: &[&str] = &["pdf", "document", "summarize", "file"];
pub const WEB_KEYWORDS: &[&str] = &["search", "web", "current", "news", "recent", "latest"];

/// Choose the retrieval strategy for a question.
pub fn select_tool(question: &str) -> ToolChoice {
    let folded = question.to_lowercase();
    let hit = |keywords: &[&str]| keywords.iter().any(|k| folded.contains(k));

    if hit(PDF_KEYWORDS) {
        ToolChoice::PdfSummarize
    } else if hit(WEB_KEYWORDS) {
        ToolChoice::WebSearch
    } else {
        ToolChoice::MemoryLookup
    }
}
