//! Embedding backends for the similarity store.
//!
//! Implementations of [`Embedder`]:
//! - **`local`**: `LocalEmbedder`, fastembed on-device models (feature `local-embeddings-fastembed`, on by default). The default provider.
//! - **`hash`**: [`HashEmbedder`] from the core crate. Deterministic and offline; used in tests.
//! - **`openai`**: [`OpenAiEmbedder`], `POST {base_url}/embeddings` with retry and backoff.
//! - **`ollama`**: [`OllamaEmbedder`], `POST {url}/api/embed` on a local Ollama.
//! - **`disabled`**: [`DisabledEmbedder`], every call fails.
//!
//! Use [`create_embedder`] to build the backend named by the configuration:
//!
//! ```rust,no_run
//! # use research_harness::config::EmbeddingConfig;
//! # use research_harness::embedding::create_embedder;
//! let config = EmbeddingConfig {
//!     provider: "hash".to_string(),
//!     ..Default::default()
//! };
//! let embedder = create_embedder(&config).unwrap();
//! assert_eq!(embedder.model_name(), "hash-fnv1a");
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use research_harness_core::embedding::{Embedder, HashEmbedder};
use research_harness_core::ProviderError;

use crate::config::EmbeddingConfig;
use crate::http;

/// Dimensionality used by the hash embedder when `embedding.dims` is unset.
pub const DEFAULT_HASH_DIMS: usize = 384;

// ============ Disabled ============

pub struct DisabledEmbedder;

#[async_trait]
impl Embedder for DisabledEmbedder {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::Disabled("embedding provider".to_string()))
    }
}

// ============ OpenAI ============

/// Embeddings via the OpenAI API. Requires `OPENAI_API_KEY`.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    dims: usize,
    batch_size: usize,
    max_retries: u32,
    backoff: Duration,
}

impl OpenAiEmbedder {
    /// # Errors
    ///
    /// Returns an error if `model` or `dims` is not set in config,
    /// or if `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for OpenAI provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow::anyhow!("embedding.dims required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let base = config
            .url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client: http::client(config.timeout_secs)?,
            api_key,
            endpoint: format!("{}/embeddings", base.trim_end_matches('/')),
            model,
            dims,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            backoff: http::DEFAULT_BACKOFF,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = serde_json::json!({
                "model": self.model,
                "input": batch,
            });
            let json = http::send_json_with_retry(
                || {
                    self.client
                        .post(&self.endpoint)
                        .header("Authorization", format!("Bearer {}", self.api_key))
                        .json(&body)
                },
                "OpenAI",
                self.max_retries,
                self.backoff,
            )
            .await?;
            out.extend(parse_openai_response(&json)?);
        }
        Ok(out)
    }
}

/// Extract `data[].embedding`, ordered by each item's `index`.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| ProviderError::Parse("OpenAI response missing data array".to_string()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| ProviderError::Parse("OpenAI response missing embedding".to_string()))?;
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);
        indexed.push((index, to_f32_vec(embedding)));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

// ============ Ollama ============

/// Embeddings from a local Ollama instance (default `http://localhost:11434`).
pub struct OllamaEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    dims: usize,
    max_retries: u32,
    backoff: Duration,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for Ollama provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow::anyhow!("embedding.dims required for Ollama provider"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(Self {
            client: http::client(config.timeout_secs)?,
            url,
            model,
            dims,
            max_retries: config.max_retries,
            backoff: http::DEFAULT_BACKOFF,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });
        let endpoint = format!("{}/api/embed", self.url.trim_end_matches('/'));
        let json = http::send_json_with_retry(
            || self.client.post(&endpoint).json(&body),
            "Ollama",
            self.max_retries,
            self.backoff,
        )
        .await?;
        parse_ollama_response(&json)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| ProviderError::Parse("Ollama response missing embeddings array".to_string()))?;

    embeddings
        .iter()
        .map(|embedding| {
            embedding
                .as_array()
                .map(|values| to_f32_vec(values))
                .ok_or_else(|| ProviderError::Parse("Ollama embedding is not an array".to_string()))
        })
        .collect()
}

fn to_f32_vec(values: &[serde_json::Value]) -> Vec<f32> {
    values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect()
}

// ============ Local (fastembed) ============

/// On-device sentence embeddings. Models download from Hugging Face on
/// first use and run offline afterwards.
#[cfg(feature = "local-embeddings-fastembed")]
pub struct LocalEmbedder {
    model_name: String,
    dims: usize,
    batch_size: usize,
    model: Arc<std::sync::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings-fastembed")]
impl LocalEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_name = config
            .model
            .clone()
            .unwrap_or_else(|| "all-minilm-l6-v2".to_string());
        let (fastembed_model, default_dims) = config_to_fastembed_model(&model_name)?;
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed_model).with_show_download_progress(false),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize local embedding model: {}", e))?;

        Ok(Self {
            model_name,
            dims: config.dims.unwrap_or(default_dims),
            batch_size: config.batch_size.max(1),
            model: Arc::new(std::sync::Mutex::new(model)),
        })
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| ProviderError::Storage("local embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| ProviderError::Api(format!("local embedding failed: {}", e)))
        })
        .await
        .map_err(|e| ProviderError::Api(format!("local embedding task failed: {}", e)))?
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
fn config_to_fastembed_model(name: &str) -> Result<(fastembed::EmbeddingModel, usize)> {
    use fastembed::EmbeddingModel as M;
    match name {
        "all-minilm-l6-v2" => Ok((M::AllMiniLML6V2, 384)),
        "bge-small-en-v1.5" => Ok((M::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((M::BGEBaseENV15, 768)),
        "bge-large-en-v1.5" => Ok((M::BGELargeENV15, 1024)),
        "nomic-embed-text-v1.5" => Ok((M::NomicEmbedTextV15, 768)),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1.5",
            other
        ),
    }
}

/// Build the [`Embedder`] named by `config.provider`.
///
/// | Config Value | Backend |
/// |-------------|----------|
/// | `"hash"` | [`HashEmbedder`] |
/// | `"openai"` | [`OpenAiEmbedder`] |
/// | `"ollama"` | [`OllamaEmbedder`] |
/// | `"local"` | `LocalEmbedder` (feature `local-embeddings-fastembed`) |
/// | `"disabled"` | [`DisabledEmbedder`] |
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(
            config.dims.unwrap_or(DEFAULT_HASH_DIMS),
        ))),
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Ok(Arc::new(LocalEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings-fastembed"),
        "disabled" => Ok(Arc::new(DisabledEmbedder)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_is_default() {
        assert_eq!(EmbeddingConfig::default().provider, "local");
    }

    #[test]
    fn test_hash_opt_in() {
        let config = EmbeddingConfig {
            provider: "hash".to_string(),
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.model_name(), "hash-fnv1a");
        assert_eq!(embedder.dims(), DEFAULT_HASH_DIMS);
    }

    #[tokio::test]
    async fn test_disabled_fails() {
        let config = EmbeddingConfig {
            provider: "disabled".to_string(),
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        let err = embedder.embed(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Disabled(_)));
    }

    #[test]
    fn test_parse_openai_orders_by_index() {
        let body = json!({ "data": [
            { "index": 1, "embedding": [0.0, 1.0] },
            { "index": 0, "embedding": [1.0, 0.0] }
        ]});
        let vectors = parse_openai_response(&body).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_ollama_rejects_missing_array() {
        assert!(parse_ollama_response(&json!({})).is_err());
        let ok = parse_ollama_response(&json!({ "embeddings": [[0.5, 0.5]] })).unwrap();
        assert_eq!(ok, vec![vec![0.5, 0.5]]);
    }
}
