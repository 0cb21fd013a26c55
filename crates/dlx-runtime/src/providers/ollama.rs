//! Ollama provider implementation.
//!
//! Talks to a local Ollama daemon over its `/api/generate` endpoint,
//! non-streaming. The daemon owns model loading and memory; we only
//! send a prompt and read back the decoded generation.

use super::{GenerationConfig, LlmProvider, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
}

impl OllamaProvider {
    /// Create a provider against the default local daemon.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn client() -> &'static reqwest::Client {
        static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client")
        })
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Ollama generate request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        let request = OllamaRequest {
            model: &config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
        };

        let response = Self::client()
            .post(format!("{}/api/generate", self.base_url))
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let decoded: OllamaResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::DecodeError(err.to_string()))?;

        Ok(decoded.response)
    }

    async fn health_check(&self) -> bool {
        Self::client()
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = OllamaRequest {
            model: "llama3:8b",
            prompt: "Extract fields",
            stream: false,
            options: OllamaOptions {
                temperature: 0.3,
                num_predict: 512,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3:8b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 512);
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{"model":"llama3:8b","response":"{\"first_name\":\"HARRISON\"}","done":true}"#;
        let decoded: OllamaResponse = serde_json::from_str(raw).unwrap();
        assert!(decoded.response.contains("HARRISON"));
    }

    #[test]
    fn test_base_url_override() {
        let provider = OllamaProvider::new().with_base_url("http://10.0.0.5:11434");
        assert_eq!(provider.base_url, "http://10.0.0.5:11434");
    }
}
