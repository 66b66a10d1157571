//! Collaborator traits consumed by the research pipeline.
//!
//! Every external dependency of a run is reached through one of these
//! narrow traits, so the [`Pipeline`](crate::pipeline::Pipeline) can be
//! wired to real providers in production and to fakes in tests.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     Pipeline                         │
//! │  ┌──────────┐ ┌─────────────┐ ┌────────────┐         │
//! │  │WebSearch │ │TextGenerator│ │PdfExtractor│         │
//! │  │ (Brave)  │ │  (OpenAI)   │ │(pdf-extract│         │
//! │  └──────────┘ └─────────────┘ └────────────┘         │
//! │  ┌──────────────────────────┐ ┌──────────────┐       │
//! │  │ SimilarityStore          │ │ MemoryStore  │       │
//! │  │ Embedder + VectorIndex   │ │ JSON log     │       │
//! │  └──────────────────────────┘ └──────────────┘       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! All methods return [`ProviderError`] on failure; none of them swallow
//! errors. Degrading to empty results is the pipeline's decision.

use async_trait::async_trait;

use research_harness_core::{ProviderError, SearchResult};

pub use research_harness_core::embedding::Embedder;
pub use research_harness_core::store::VectorIndex;

/// A web search provider.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Provider name for logs (e.g. `"brave"`).
    fn name(&self) -> &str;

    /// Return up to `count` results for `query`, best first.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, ProviderError>;
}

/// A text-generation provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt` within `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError>;
}

/// Fetches a PDF and extracts its plain text.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    /// Returns the extracted text, possibly empty.
    async fn extract_from_url(&self, url: &str) -> Result<String, ProviderError>;
}

/// Provider used when a collaborator is configured as `disabled`.
///
/// Every call fails with [`ProviderError::Disabled`], which the pipeline
/// degrades like any other provider failure.
pub struct Disabled(pub &'static str);

#[async_trait]
impl WebSearch for Disabled {
    fn name(&self) -> &str {
        self.0
    }
    async fn search(&self, _query: &str, _count: usize) -> Result<Vec<SearchResult>, ProviderError> {
        Err(ProviderError::Disabled(self.0.to_string()))
    }
}

#[async_trait]
impl TextGenerator for Disabled {
    fn model_name(&self) -> &str {
        "disabled"
    }
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, ProviderError> {
        Err(ProviderError::Disabled(self.0.to_string()))
    }
}
