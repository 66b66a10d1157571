//! The research pipeline: stage functions plus the interpreter loop that
//! walks the transition table from [`research_harness_core::graph`].
//!
//! # Run
//!
//! ```text
//! state = RunState::new(question)
//! stage = ReceiveQuestion
//! loop:
//!     execute(stage, &mut state)     // one stage function
//!     state.path.push(stage)
//!     stage = next_stage(stage, &state, on_error)
//!     until stage == End
//! ```
//!
//! Every collaborator call is bounded by `stage_timeout`. Collaborator
//! failures never abort a run: they are logged and replaced by an empty
//! result, and `RunState::error` is set only for the conditions a caller
//! is expected to see ("No search results found" and friends).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use research_harness_core::chunk::{pdf_documents, PDF_CHUNK_CHARS};
use research_harness_core::graph::{next_stage, ErrorPolicy, Stage};
use research_harness_core::prompt::{
    answer_prompt, build_context, extract_citations, pdf_summary_prompt, ANSWER_MAX_TOKENS,
    DEFAULT_MAX_TOKENS,
};
use research_harness_core::router::select_tool;
use research_harness_core::text::{ellipsize, extract_first_url};
use research_harness_core::{DocumentRecord, ProviderError, RunState, SearchResult};

use crate::config::Config;
use crate::memory_store::MemoryStore;
use crate::traits::{PdfExtractor, TextGenerator, WebSearch};
use crate::vector_store::SimilarityStore;

pub const ERR_NO_QUESTION: &str = "No question provided";
pub const ERR_NO_SEARCH_RESULTS: &str = "No search results found";
pub const ERR_NO_PDF_URL: &str = "No PDF URL found in question";
pub const ERR_PDF_EMPTY: &str = "Could not extract text from PDF";

/// Memory answers shown as snippets are cut at this many characters.
const MEMORY_SNIPPET_CHARS: usize = 300;

/// External services and stores a run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub search: Arc<dyn WebSearch>,
    pub generator: Arc<dyn TextGenerator>,
    pub pdf: Arc<dyn PdfExtractor>,
    pub similarity: Arc<SimilarityStore>,
    pub memory: Arc<MemoryStore>,
}

/// Tunables for a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_search_results: usize,
    pub max_rag_docs: usize,
    pub max_memory_results: usize,
    pub on_error: ErrorPolicy,
    pub stage_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_search_results: config.retrieval.max_search_results,
            max_rag_docs: config.retrieval.max_rag_docs,
            max_memory_results: config.retrieval.max_memory_results,
            on_error: config.pipeline.on_error,
            stage_timeout: Duration::from_secs(config.pipeline.stage_timeout_secs),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::minimal())
    }
}

pub struct Pipeline {
    collaborators: Collaborators,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.collaborators.memory
    }

    /// Execute one research run for `question`.
    ///
    /// Always returns the final state; inspect `error` to see whether
    /// something went wrong along the way.
    pub async fn run(&self, question: &str) -> RunState {
        let mut state = RunState::new(question);
        let mut stage = Stage::ENTRY;

        while stage != Stage::End {
            self.execute(stage, &mut state).await;
            state.path.push(stage);
            stage = next_stage(stage, &state, self.settings.on_error);
        }
        state.path.push(Stage::End);

        if let Some(error) = &state.error {
            tracing::info!(error = %error, path = ?state.path, "run finished with error");
        } else {
            tracing::info!(tool = ?state.tool_choice, citations = state.citations.len(), "run finished");
        }
        state
    }

    async fn execute(&self, stage: Stage, state: &mut RunState) {
        match stage {
            Stage::ReceiveQuestion => receive_question(state),
            Stage::SelectTool => {
                let tool = select_tool(&state.question);
                tracing::info!(tool = %tool, "selected tool");
                state.tool_choice = Some(tool);
            }
            Stage::WebSearch => self.web_search(state).await,
            Stage::PdfSummarize => self.pdf_summarize(state).await,
            Stage::MemoryLookup => self.memory_lookup(state).await,
            Stage::RagContext => self.rag_context(state).await,
            Stage::GenerateAnswer => self.generate_answer(state).await,
            Stage::UpdateMemory => self.update_memory(state).await,
            Stage::End => {}
        }
    }

    async fn web_search(&self, state: &mut RunState) {
        let search = &self.collaborators.search;
        tracing::info!(provider = search.name(), "searching the web");

        let results = self
            .bounded(
                "web search",
                search.search(&state.question, self.settings.max_search_results),
            )
            .await
            .unwrap_or_default();

        if results.is_empty() {
            state.fail(ERR_NO_SEARCH_RESULTS);
            return;
        }

        let docs: Vec<DocumentRecord> = results.iter().map(DocumentRecord::from_search_result).collect();
        self.index_documents(&docs).await;
        state.search_results = results;
    }

    async fn pdf_summarize(&self, state: &mut RunState) {
        let Some(url) = extract_first_url(&state.question).map(str::to_string) else {
            state.fail(ERR_NO_PDF_URL);
            return;
        };
        tracing::info!(url = %url, "processing PDF");

        let text = self
            .bounded("PDF extraction", self.collaborators.pdf.extract_from_url(&url))
            .await
            .unwrap_or_default();
        if text.is_empty() {
            state.fail(ERR_PDF_EMPTY);
            return;
        }

        let docs = pdf_documents(&text, &url, PDF_CHUNK_CHARS);
        tracing::debug!(chunks = docs.len(), "chunked PDF");
        self.index_documents(&docs).await;

        let prompt = pdf_summary_prompt(&state.question, &text);
        let summary = self.generate(&prompt, DEFAULT_MAX_TOKENS).await;

        state.search_results = vec![SearchResult {
            title: format!("PDF Summary: {}", state.question),
            snippet: summary,
            url: Some(url),
            source: "PDF Document".to_string(),
            ..Default::default()
        }];
    }

    async fn memory_lookup(&self, state: &mut RunState) {
        let entries = self
            .collaborators
            .memory
            .search(&state.question, self.settings.max_memory_results)
            .await;
        tracing::info!(matches = entries.len(), "looked up memory");

        state.search_results = entries
            .iter()
            .map(|entry| SearchResult {
                title: format!("Previous Q&A: {}", entry.question),
                snippet: ellipsize(&entry.answer, MEMORY_SNIPPET_CHARS),
                url: Some("memory".to_string()),
                source: "Previous Conversation".to_string(),
                timestamp: Some(entry.timestamp.to_rfc3339()),
                ..Default::default()
            })
            .collect();
        state.memory_context = entries;
    }

    async fn rag_context(&self, state: &mut RunState) {
        state.rag_docs = self
            .bounded(
                "similarity search",
                self.collaborators
                    .similarity
                    .similarity_search(&state.question, self.settings.max_rag_docs),
            )
            .await
            .unwrap_or_default();
        tracing::info!(docs = state.rag_docs.len(), "retrieved related documents");
    }

    async fn generate_answer(&self, state: &mut RunState) {
        let context = build_context(&state.search_results, &state.rag_docs, &state.memory_context);
        let prompt = answer_prompt(&state.question, &context);

        state.answer = Some(self.generate(&prompt, ANSWER_MAX_TOKENS).await);
        state.citations = extract_citations(&state.search_results);
    }

    async fn update_memory(&self, state: &mut RunState) {
        let answer = state.answer.as_deref().unwrap_or_default();
        self.collaborators
            .memory
            .add_entry(&state.question, answer, state.citations.clone())
            .await;
    }

    /// Generation never fails a run; the error text becomes the output.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> String {
        let call = self.collaborators.generator.generate(prompt, max_tokens);
        match with_timeout(self.settings.stage_timeout, call).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(model = self.collaborators.generator.model_name(), error = %e, "generation failed");
                format!("Error generating response: {}", e)
            }
        }
    }

    async fn index_documents(&self, docs: &[DocumentRecord]) {
        let _ = self
            .bounded(
                "similarity store insert",
                self.collaborators.similarity.add_documents(docs),
            )
            .await;
    }

    /// Await `call` under the stage timeout. Failures are logged and
    /// surface as `None`.
    async fn bounded<T, F>(&self, label: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match with_timeout(self.settings.stage_timeout, call).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(call = label, error = %e, "collaborator call failed");
                None
            }
        }
    }
}

fn receive_question(state: &mut RunState) {
    let question = state.question.trim().to_string();
    if question.is_empty() {
        state.fail(ERR_NO_QUESTION);
        return;
    }
    tracing::info!(question = %question, "received question");
    state.question = question;
}

/// Bound `call` by `limit`; an elapsed timer becomes [`ProviderError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ProviderError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_question_trims() {
        let mut state = RunState::new("  what is rust?  ");
        receive_question(&mut state);
        assert_eq!(state.question, "what is rust?");
        assert!(state.error.is_none());
    }

    #[test]
    fn test_receive_question_rejects_blank() {
        let mut state = RunState::new(" \n\t ");
        receive_question(&mut state);
        assert_eq!(state.error.as_deref(), Some(ERR_NO_QUESTION));
    }

    #[tokio::test]
    async fn test_with_timeout_elapses() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, ProviderError>(1)
        };
        let err = with_timeout(Duration::from_millis(10), slow).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_millis(10)));
        assert_eq!(err.to_string(), "timed out after 10ms");
    }

    #[tokio::test]
    async fn test_with_timeout_passes_errors_through() {
        let failing = async { Err::<u8, _>(ProviderError::Api("boom".to_string())) };
        let err = with_timeout(Duration::from_secs(1), failing).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api(_)));
    }
}
