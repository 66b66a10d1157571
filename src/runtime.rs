//! Wiring of configured providers into a [`Pipeline`].

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::brave::BraveSearch;
use crate::config::Config;
use crate::embedding::create_embedder;
use crate::llm::OpenAiChat;
use crate::memory_store::MemoryStore;
use crate::pdf::HttpPdfExtractor;
use crate::pipeline::{Collaborators, Pipeline, PipelineSettings};
use crate::sqlite_index::SqliteIndex;
use crate::traits::{Disabled, TextGenerator, WebSearch};
use crate::vector_store::SimilarityStore;
use crate::{db, migrate};

/// Build a pipeline backed by the providers named in `config`.
///
/// Opens (and migrates) the SQLite index and loads the memory log. A
/// missing API key is reported once here; the affected provider is then
/// disabled so the remaining stages still run.
pub async fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool)
        .await
        .context("Failed to create similarity store schema")?;

    let embedder = create_embedder(&config.embedding)?;
    tracing::debug!(model = embedder.model_name(), dims = embedder.dims(), "embedder ready");
    let similarity = SimilarityStore::new(embedder, Arc::new(SqliteIndex::new(pool)));

    let memory = MemoryStore::load(&config.memory.path).await;

    let collaborators = Collaborators {
        search: web_search(config),
        generator: generator(config),
        pdf: Arc::new(HttpPdfExtractor::new(&config.pdf)?),
        similarity: Arc::new(similarity),
        memory: Arc::new(memory),
    };

    Ok(Pipeline::new(collaborators, PipelineSettings::from_config(config)))
}

fn web_search(config: &Config) -> Arc<dyn WebSearch> {
    if config.search.provider == "disabled" {
        return Arc::new(Disabled("web search"));
    }
    match BraveSearch::from_env(&config.search) {
        Ok(brave) => Arc::new(brave),
        Err(e) => {
            tracing::warn!(error = %e, "web search unavailable");
            Arc::new(Disabled("web search"))
        }
    }
}

fn generator(config: &Config) -> Arc<dyn TextGenerator> {
    if config.llm.provider == "disabled" {
        return Arc::new(Disabled("text generation"));
    }
    match OpenAiChat::from_env(&config.llm) {
        Ok(chat) => Arc::new(chat),
        Err(e) => {
            tracing::warn!(error = %e, "text generation unavailable");
            Arc::new(Disabled("text generation"))
        }
    }
}
