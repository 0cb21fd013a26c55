//! Model provider abstractions for dlx-runtime.
//!
//! The provider is the only place an LLM is called. Everything
//! downstream of it is deterministic and lives in `dlx-core`.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "ollama")]
mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;

/// Errors from model providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("response decode error: {0}")]
    DecodeError(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for one generation request.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model tag to use.
    pub model: String,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Sampling temperature. Low but nonzero: the 1B model degenerates
    /// into repetition at 0.0.
    pub temperature: f32,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "llama3:8b".to_string(),
            max_tokens: 512,
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }
}

impl GenerationConfig {
    /// Create a config for the given model tag.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Provider abstraction allows swapping model backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one non-streaming completion and return the decoded text.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError>;

    /// Check if the provider is reachable.
    async fn health_check(&self) -> bool;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
