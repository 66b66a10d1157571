//! TOML configuration parsing and validation.
//!
//! Every section and field has a default, so an empty file (or
//! [`Config::minimal`]) is a valid configuration. API keys are never read
//! from the file; providers take them from `OPENAI_API_KEY` and
//! `BRAVE_API_KEY` (a `.env` file is loaded by the CLI at startup).
//!
//! # Example
//!
//! ```toml
//! [db]
//! path = "./data/rh.sqlite"
//!
//! [memory]
//! path = "./data/memory_store.json"
//!
//! [retrieval]
//! max_search_results = 5
//! max_rag_docs = 3
//! max_memory_results = 3
//!
//! [pipeline]
//! on_error = "continue"      # or "halt"
//! stage_timeout_secs = 60
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [search]
//! provider = "brave"
//!
//! [embedding]
//! provider = "local"         # local | hash | openai | ollama | disabled
//! model = "all-minilm-l6-v2"
//!
//! [server]
//! bind = "0.0.0.0:5000"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use research_harness_core::ErrorPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// All defaults. Used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/rh.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
        }
    }
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("./data/memory_store.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
    #[serde(default = "default_max_rag_docs")]
    pub max_rag_docs: usize,
    #[serde(default = "default_max_memory_results")]
    pub max_memory_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_search_results: default_max_search_results(),
            max_rag_docs: default_max_rag_docs(),
            max_memory_results: default_max_memory_results(),
        }
    }
}

fn default_max_search_results() -> usize {
    5
}
fn default_max_rag_docs() -> usize {
    3
}
fn default_max_memory_results() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_error: ErrorPolicy,
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::default(),
            stage_timeout_secs: default_stage_timeout_secs(),
        }
    }
}

fn default_stage_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: String,
    #[serde(default = "default_search_url")]
    pub base_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            base_url: default_search_url(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_search_provider() -> String {
    "brave".to_string()
}
fn default_search_url() -> String {
    "https://api.search.brave.com/res/v1/web/search".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PdfConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Downloads larger than this are rejected before extraction.
    #[serde(default = "default_pdf_max_bytes")]
    pub max_bytes: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_bytes: default_pdf_max_bytes(),
        }
    }
}

fn default_pdf_max_bytes() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_embedding_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    30
}

/// Parse configuration from a TOML string and validate it.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.retrieval.max_search_results == 0 {
        anyhow::bail!("retrieval.max_search_results must be >= 1");
    }
    if config.pipeline.stage_timeout_secs == 0 {
        anyhow::bail!("pipeline.stage_timeout_secs must be > 0");
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    match config.llm.provider.as_str() {
        "openai" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be openai or disabled.",
            other
        ),
    }

    match config.search.provider.as_str() {
        "brave" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown search provider: '{}'. Must be brave or disabled.",
            other
        ),
    }

    match config.embedding.provider.as_str() {
        "disabled" | "hash" | "openai" | "ollama" | "local" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, hash, openai, ollama, or local.",
            other
        ),
    }

    if matches!(config.embedding.provider.as_str(), "openai" | "ollama") {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    Ok(())
}
