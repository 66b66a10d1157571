//! Shared HTTP plumbing for provider clients: client construction and a
//! retrying JSON request loop.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: `base × 2^(attempt-1)`, exponent capped at 5

use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use research_harness_core::ProviderError;

/// Default delay before the first retry.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Build a client with a per-request timeout.
pub fn client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Send the request produced by `build` until it succeeds, a
/// non-retryable status is returned, or `max_retries` is exhausted, and
/// parse the body as JSON.
///
/// `label` names the provider in error messages (e.g. `"OpenAI"`).
pub async fn send_json_with_retry<F>(
    build: F,
    label: &str,
    max_retries: u32,
    backoff: Duration,
) -> Result<serde_json::Value, ProviderError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff * (1u32 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response
                        .json::<serde_json::Value>()
                        .await
                        .map_err(|e| ProviderError::Parse(format!("{} response: {}", label, e)));
                }

                let body_text = response.text().await.unwrap_or_default();
                let err = ProviderError::Api(format!("{} API error {}: {}", label, status, body_text));

                if status.as_u16() == 429 || status.is_server_error() {
                    tracing::debug!(provider = label, attempt, %status, "retryable provider error");
                    last_err = Some(err);
                    continue;
                }

                return Err(err);
            }
            Err(e) => {
                tracing::debug!(provider = label, attempt, error = %e, "provider request failed");
                last_err = Some(if e.is_timeout() {
                    ProviderError::Network(format!("{} request timed out: {}", label, e))
                } else {
                    ProviderError::Network(format!("{} connection error: {}", label, e))
                });
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        ProviderError::Network(format!("{} request failed after retries", label))
    }))
}
