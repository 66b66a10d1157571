//! Core data models that flow through a research run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::Stage;

/// The retrieval strategy chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    WebSearch,
    PdfSummarize,
    MemoryLookup,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::WebSearch => "web_search",
            ToolChoice::PdfSummarize => "pdf_summarize",
            ToolChoice::MemoryLookup => "memory_lookup",
        }
    }
}

impl fmt::Display for ToolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One result produced by a retrieval strategy.
///
/// Web results carry `published`; memory results carry `timestamp`.
/// `url` is optional because only entries with a URL become citations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Metadata attached to a document submitted to the similarity store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Origin URL (web result URL or PDF URL).
    pub source: String,
    /// `"web_search"` or `"pdf"`.
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<usize>,
}

/// A unit of content submitted to the similarity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl DocumentRecord {
    /// Build the record stored for a web search hit: title and snippet on
    /// separate lines, sourced from the result URL.
    pub fn from_search_result(result: &SearchResult) -> Self {
        Self {
            content: format!("{}\n{}", result.title, result.snippet),
            metadata: DocumentMetadata {
                source: result.url.clone().unwrap_or_default(),
                doc_type: "web_search".to_string(),
                title: Some(result.title.clone()),
                chunk_id: None,
            },
        }
    }
}

/// A document returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagDoc {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub source: String,
    /// Distance from the query; lower is closer.
    pub score: f32,
}

/// A persisted question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(question: &str, answer: &str, citations: Vec<String>) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            citations,
            timestamp: Utc::now(),
        }
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones, which are
/// read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

/// State threaded through one pipeline execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunState {
    pub question: String,
    pub tool_choice: Option<ToolChoice>,
    pub search_results: Vec<SearchResult>,
    pub rag_docs: Vec<RagDoc>,
    pub memory_context: Vec<MemoryEntry>,
    pub answer: Option<String>,
    pub citations: Vec<String>,
    pub error: Option<String>,
    /// Stages executed, in order.
    pub path: Vec<Stage>,
}

impl RunState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// Record an error. The first error wins; later ones are dropped so the
    /// caller sees the root cause.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn visited(&self, stage: Stage) -> bool {
        self.path.contains(&stage)
    }
}
