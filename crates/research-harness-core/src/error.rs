//! Error type shared by every external collaborator.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single call to an external provider or store.
///
/// Collaborators return this instead of swallowing failures, so the
/// orchestrator can log the cause and decide how the run degrades.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing API key or invalid provider settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failure or transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the provider.
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The call did not complete within the stage timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Local persistence failure (SQLite, JSON log).
    #[error("storage error: {0}")]
    Storage(String),

    /// The provider is configured as `disabled`.
    #[error("{0} is disabled")]
    Disabled(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Network(_) | ProviderError::Timeout(_))
    }
}
