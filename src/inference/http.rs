//! HTTP inference backend
//!
//! Posts `{prompt, model_config}` to `<endpoint>/generate` and expects
//! `{"text": "..."}`. Uses a long-lived reqwest::Client for connection pooling;
//! the per-call deadline comes from `ModelSelector::query`.

use super::InferenceBackend;
use crate::error::AssistantError;
use crate::models::ModelConfig;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Reusable inference client (connection-pooled)
pub struct HttpInferenceBackend {
    client: Client,
    base_url: Option<String>,
}

impl HttpInferenceBackend {
    /// `base_url` is used for configs that carry no endpoint of their own
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    fn endpoint_for(&self, config: &ModelConfig) -> Option<String> {
        config
            .endpoint
            .as_deref()
            .map(|e| e.trim_end_matches('/').to_string())
            .or_else(|| self.base_url.clone())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model_config: &'a ModelConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

#[async_trait::async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn generate(&self, prompt: &str, config: &ModelConfig) -> Result<String> {
        let endpoint = self.endpoint_for(config).ok_or_else(|| {
            AssistantError::Backend(format!("No endpoint configured for {}", config.vendor))
        })?;
        let url = format!("{}/generate", endpoint);

        debug!(vendor = %config.vendor, model = %config.model_name, "Calling inference backend");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                prompt,
                model_config: config,
            })
            .send()
            .await
            .map_err(|e| {
                error!("Inference request failed: {}", e);
                AssistantError::Backend(format!("Inference request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Inference backend error response: {}", error_text);
            return Err(AssistantError::Backend(format!(
                "Inference backend error: {}",
                error_text
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            error!("Failed to parse inference response: {}", e);
            AssistantError::Backend(format!("Inference parse error: {}", e))
        })?;

        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Provider, Vendor};

    fn config(endpoint: Option<&str>) -> ModelConfig {
        ModelConfig {
            provider: Provider::Local,
            vendor: Vendor::Ollama,
            model_name: "mistral".to_string(),
            endpoint: endpoint.map(|e| e.to_string()),
            temperature: 0.7,
            max_tokens: 150,
            timeout_ms: 3000,
        }
    }

    #[test]
    fn test_request_serialization() {
        let config = config(None);
        let request = GenerateRequest {
            prompt: "open notepad",
            model_config: &config,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("open notepad"));
        assert!(json.contains("\"vendor\":\"ollama\""));
    }

    #[test]
    fn test_endpoint_resolution() {
        let backend = HttpInferenceBackend::new(Some("http://gateway/".to_string())).unwrap();

        assert_eq!(
            backend.endpoint_for(&config(Some("http://localhost:11434/"))).as_deref(),
            Some("http://localhost:11434")
        );
        assert_eq!(backend.endpoint_for(&config(None)).as_deref(), Some("http://gateway"));

        let bare = HttpInferenceBackend::new(None).unwrap();
        assert!(bare.endpoint_for(&config(None)).is_none());
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_backend_error() {
        let backend = HttpInferenceBackend::new(None).unwrap();
        let result = backend.generate("hi", &config(None)).await;
        assert!(matches!(result, Err(AssistantError::Backend(_))));
    }
}
