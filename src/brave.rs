//! Brave Search web provider.
//!
//! Calls `GET https://api.search.brave.com/res/v1/web/search` with the
//! `X-Subscription-Token` header. Requires `BRAVE_API_KEY` in the
//! environment.

use async_trait::async_trait;
use std::time::Duration;

use research_harness_core::{ProviderError, SearchResult};

use crate::config::SearchConfig;
use crate::http;
use crate::traits::WebSearch;

pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl BraveSearch {
    /// Create a Brave client from configuration and `BRAVE_API_KEY`.
    pub fn from_env(config: &SearchConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var("BRAVE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Config("BRAVE_API_KEY not set".to_string()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            api_key: api_key.into(),
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            backoff: http::DEFAULT_BACKOFF,
        })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

#[async_trait]
impl WebSearch for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, ProviderError> {
        let count = count.to_string();
        let json = http::send_json_with_retry(
            || {
                self.client
                    .get(&self.base_url)
                    .header("Accept", "application/json")
                    .header("X-Subscription-Token", &self.api_key)
                    .query(&[
                        ("q", query),
                        ("count", count.as_str()),
                        ("result_filter", "web"),
                        ("safesearch", "moderate"),
                    ])
            },
            "Brave",
            self.max_retries,
            self.backoff,
        )
        .await?;

        let results = parse_brave_response(&json);
        tracing::info!(count = results.len(), query, "retrieved search results");
        Ok(results)
    }
}

/// Map `web.results[]` into [`SearchResult`]s.
///
/// `description` becomes the snippet, `age` the published marker and
/// `profile.name` the source (defaulting to `"web"`). A missing `web`
/// section yields no results rather than an error.
pub fn parse_brave_response(json: &serde_json::Value) -> Vec<SearchResult> {
    let Some(items) = json
        .get("web")
        .and_then(|w| w.get("results"))
        .and_then(|r| r.as_array())
    else {
        return Vec::new();
    };

    let str_field = |item: &serde_json::Value, key: &str| {
        item.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    items
        .iter()
        .map(|item| {
            let url = str_field(item, "url");
            let published = str_field(item, "age");
            SearchResult {
                title: str_field(item, "title"),
                snippet: str_field(item, "description"),
                url: Some(url).filter(|u| !u.is_empty()),
                source: item
                    .get("profile")
                    .and_then(|p| p.get("name"))
                    .and_then(|n| n.as_str())
                    .unwrap_or("web")
                    .to_string(),
                published: Some(published).filter(|p| !p.is_empty()),
                timestamp: None,
            }
        })
        .collect()
}
