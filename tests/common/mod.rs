//! In-process fakes for every pipeline collaborator.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use research_harness::memory_store::MemoryStore;
use research_harness::pipeline::{Collaborators, Pipeline, PipelineSettings};
use research_harness::traits::{PdfExtractor, TextGenerator, WebSearch};
use research_harness::vector_store::SimilarityStore;
use research_harness_core::embedding::HashEmbedder;
use research_harness_core::store::memory::InMemoryIndex;
use research_harness_core::{ProviderError, SearchResult};

// ─── Web search ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSearch {
    pub results: Vec<SearchResult>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(&self, _query: &str, count: usize) -> Result<Vec<SearchResult>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        Ok(self.results.iter().take(count).cloned().collect())
    }
}

pub fn web_result(title: &str, url: Option<&str>) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        snippet: format!("{title} snippet"),
        url: url.map(str::to_string),
        source: "web".to_string(),
        ..Default::default()
    }
}

// ─── Generator ──────────────────────────────────────────────────────

pub struct FakeGenerator {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<(String, u32)>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying("")
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<(String, u32)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));
        if self.fail {
            return Err(ProviderError::Api("OpenAI API error 401: invalid key".to_string()));
        }
        Ok(self.reply.clone())
    }
}

// ─── PDF extractor ──────────────────────────────────────────────────

#[derive(Default)]
pub struct FakePdf {
    pub text: String,
    pub calls: AtomicUsize,
}

impl FakePdf {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfExtractor for FakePdf {
    async fn extract_from_url(&self, _url: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

// ─── Harness ────────────────────────────────────────────────────────

pub struct Harness {
    pub tmp: TempDir,
    pub search: Arc<FakeSearch>,
    pub generator: Arc<FakeGenerator>,
    pub pdf: Arc<FakePdf>,
    pub similarity: Arc<SimilarityStore>,
    pub memory: Arc<MemoryStore>,
    pub pipeline: Arc<Pipeline>,
}

pub async fn harness(
    search: FakeSearch,
    generator: FakeGenerator,
    pdf: FakePdf,
    settings: PipelineSettings,
) -> Harness {
    let tmp = TempDir::new().unwrap();
    let search = Arc::new(search);
    let generator = Arc::new(generator);
    let pdf = Arc::new(pdf);
    let similarity = Arc::new(SimilarityStore::new(
        Arc::new(HashEmbedder::new(256)),
        Arc::new(InMemoryIndex::new()),
    ));
    let memory = Arc::new(MemoryStore::load(tmp.path().join("memory.json")).await);

    let pipeline = Arc::new(Pipeline::new(
        Collaborators {
            search: search.clone(),
            generator: generator.clone(),
            pdf: pdf.clone(),
            similarity: similarity.clone(),
            memory: memory.clone(),
        },
        settings,
    ));

    Harness {
        tmp,
        search,
        generator,
        pdf,
        similarity,
        memory,
        pipeline,
    }
}
