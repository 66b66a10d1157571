//! Prompt templates, context assembly, and citation extraction.
//!
//! The answer prompt embeds a context block built from up to three
//! sections, always in this order and each omitted when empty:
//!
//! | Section | Source | Items | Truncation |
//! |---------|--------|-------|------------|
//! | `## Search Results:` | `search_results` | first 3 | none |
//! | `## Related Documents:` | `rag_docs` | all | 200 chars + `...` |
//! | `## Previous Conversations:` | `memory_context` | all | 100 chars + `...` |

use crate::models::{MemoryEntry, RagDoc, SearchResult};
use crate::text::{head, ELLIPSIS};

/// Token budget for the final answer.
pub const ANSWER_MAX_TOKENS: u32 = 1500;
/// Token budget for every other generation call.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful research assistant. Provide accurate, well-cited responses.";

const SEARCH_RESULTS_SHOWN: usize = 3;
const RAG_CONTENT_CHARS: usize = 200;
const MEMORY_ANSWER_CHARS: usize = 100;
const PDF_PROMPT_CHARS: usize = 3000;

/// Build the labeled context block fed into the answer prompt.
pub fn build_context(
    search_results: &[SearchResult],
    rag_docs: &[RagDoc],
    memory_context: &[MemoryEntry],
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !search_results.is_empty() {
        parts.push("## Search Results:".to_string());
        for (i, result) in search_results.iter().take(SEARCH_RESULTS_SHOWN).enumerate() {
            let title = if result.title.is_empty() {
                "Unknown"
            } else {
                result.title.as_str()
            };
            let source = result
                .url
                .as_deref()
                .or(Some(result.source.as_str()).filter(|s| !s.is_empty()))
                .unwrap_or("Unknown");
            parts.push(format!("{}. **{}**", i + 1, title));
            parts.push(format!("   Source: {}", source));
            parts.push(format!("   Content: {}", result.snippet));
        }
    }

    if !rag_docs.is_empty() {
        parts.push("\n## Related Documents:".to_string());
        for (i, doc) in rag_docs.iter().enumerate() {
            parts.push(format!("{}. Source: {}", i + 1, doc.source));
            parts.push(format!(
                "   Content: {}{}",
                head(&doc.content, RAG_CONTENT_CHARS),
                ELLIPSIS
            ));
        }
    }

    if !memory_context.is_empty() {
        parts.push("\n## Previous Conversations:".to_string());
        for (i, mem) in memory_context.iter().enumerate() {
            parts.push(format!("{}. Q: {}", i + 1, mem.question));
            parts.push(format!(
                "   A: {}{}",
                head(&mem.answer, MEMORY_ANSWER_CHARS),
                ELLIPSIS
            ));
        }
    }

    parts.join("\n")
}

/// The final answer prompt.
pub fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a research assistant. Answer the following question using the provided context.

Question: {question}

Context:
{context}

Instructions:
1. Provide a comprehensive answer based on the context
2. Include specific citations using [Source: URL/Title] format
3. If information is insufficient, mention what additional information would be helpful
4. Be factual and acknowledge limitations in the available information

Answer:
"
    )
}

/// The PDF summarization prompt. Only the first 3000 characters of the
/// extracted text are embedded, always followed by an ellipsis marker.
pub fn pdf_summary_prompt(question: &str, pdf_text: &str) -> String {
    format!(
        "Summarize the following PDF content in relation to the question: \"{question}\"

PDF Content:
{excerpt}{ellipsis}

Please provide a concise summary highlighting the key points relevant to the question.
",
        excerpt = head(pdf_text, PDF_PROMPT_CHARS),
        ellipsis = ELLIPSIS,
    )
}

/// Distinct `url` values across results, in first-seen order.
pub fn extract_citations(search_results: &[SearchResult]) -> Vec<String> {
    let mut citations: Vec<String> = Vec::new();
    for url in search_results.iter().filter_map(|r| r.url.as_ref()) {
        if !citations.contains(url) {
            citations.push(url.clone());
        }
    }
    citations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;

    fn result(url: Option<&str>) -> SearchResult {
        SearchResult {
            title: "t".into(),
            snippet: "s".into(),
            url: url.map(str::to_string),
            source: "web".into(),
            ..Default::default()
        }
    }

    fn rag(content: &str) -> RagDoc {
        RagDoc {
            content: content.to_string(),
            metadata: DocumentMetadata::default(),
            source: "https://doc".into(),
            score: 0.1,
        }
    }

    #[test]
    fn test_citations_dedup_in_order() {
        let results = vec![result(Some("a")), result(Some("a")), result(Some("b")), result(None)];
        assert_eq!(extract_citations(&results), vec!["a", "b"]);
    }

    #[test]
    fn test_citations_empty() {
        assert!(extract_citations(&[]).is_empty());
    }

    #[test]
    fn test_context_empty_when_nothing_gathered() {
        assert_eq!(build_context(&[], &[], &[]), "");
    }

    #[test]
    fn test_context_only_first_three_results() {
        let results: Vec<SearchResult> = (0..5)
            .map(|i| SearchResult {
                title: format!("Title {i}"),
                snippet: format!("Snippet {i}"),
                url: Some(format!("https://r/{i}")),
                source: "web".into(),
                ..Default::default()
            })
            .collect();
        let ctx = build_context(&results, &[], &[]);
        assert!(ctx.starts_with("## Search Results:"));
        assert!(ctx.contains("3. **Title 2**"));
        assert!(ctx.contains("   Source: https://r/0"));
        assert!(!ctx.contains("Title 3"));
        assert!(!ctx.contains("Related Documents"));
    }

    #[test]
    fn test_context_source_falls_back_to_source_name() {
        let r = SearchResult {
            title: String::new(),
            snippet: "body".into(),
            url: None,
            source: "Brave".into(),
            ..Default::default()
        };
        let ctx = build_context(&[r], &[], &[]);
        assert!(ctx.contains("1. **Unknown**"));
        assert!(ctx.contains("Source: Brave"));
    }

    #[test]
    fn test_context_section_order_and_truncation() {
        let long = "d".repeat(250);
        let mem = MemoryEntry::new("old question", &"m".repeat(150), vec![]);
        let ctx = build_context(&[result(Some("u"))], &[rag(&long)], &[mem]);

        let s = ctx.find("## Search Results:").unwrap();
        let r = ctx.find("## Related Documents:").unwrap();
        let p = ctx.find("## Previous Conversations:").unwrap();
        assert!(s < r && r < p);

        assert!(ctx.contains(&format!("Content: {}...", "d".repeat(200))));
        assert!(!ctx.contains(&"d".repeat(201)));
        assert!(ctx.contains(&format!("A: {}...", "m".repeat(100))));
        assert!(ctx.contains("1. Q: old question"));
    }

    #[test]
    fn test_short_rag_content_still_gets_marker() {
        let ctx = build_context(&[], &[rag("tiny")], &[]);
        assert!(ctx.contains("Content: tiny..."));
        assert!(ctx.starts_with("\n## Related Documents:"));
    }

    #[test]
    fn test_answer_prompt_embeds_question_and_context() {
        let p = answer_prompt("Why is the sky blue?", "## Search Results:\n1. **Rayleigh**");
        assert!(p.contains("Question: Why is the sky blue?"));
        assert!(p.contains("Context:\n## Search Results:"));
        assert!(p.contains("[Source: URL/Title]"));
        assert!(p.contains("If information is insufficient"));
    }

    #[test]
    fn test_pdf_prompt_truncates_to_3000() {
        let text = "q".repeat(5000);
        let p = pdf_summary_prompt("what is it", &text);
        assert!(p.contains("\"what is it\""));
        assert!(p.contains(&format!("{}...", "q".repeat(3000))));
        assert!(!p.contains(&"q".repeat(3001)));
    }
}
