//! Inference backend selection
//!
//! Picks a cloud or local model config from complexity and connectivity,
//! walks the fallback chain `openai -> google -> ollama` and bounds every
//! backend call by the config timeout. Failures never escape: they become a
//! zero-confidence, empty-text result.

pub mod http;

pub use http::HttpInferenceBackend;

use crate::config::AssistantConfig;
use crate::models::{ComplexityTier, InferenceResult, Language, ModelConfig, Provider, Vendor};
use crate::response::detect_language;
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Confidence reported for a non-empty backend reply
pub const BACKEND_CONFIDENCE: f32 = 0.85;

/// Trait for a generative backend
#[async_trait::async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(&self, prompt: &str, config: &ModelConfig) -> Result<String>;
}

/// Chooses model configs and queries the backend with timeouts
pub struct ModelSelector {
    cloud_primary: ModelConfig,
    cloud_fallback: ModelConfig,
    local: ModelConfig,
    backend: Arc<dyn InferenceBackend>,
}

impl ModelSelector {
    pub fn new(config: &AssistantConfig, backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            cloud_primary: ModelConfig {
                provider: Provider::Cloud,
                vendor: Vendor::OpenAi,
                model_name: config.cloud_model.clone(),
                endpoint: config.cloud_endpoint.clone(),
                temperature: 0.7,
                max_tokens: 150,
                timeout_ms: config.cloud_timeout_ms,
            },
            cloud_fallback: ModelConfig {
                provider: Provider::Cloud,
                vendor: Vendor::Google,
                model_name: config.fallback_model.clone(),
                endpoint: config.cloud_endpoint.clone(),
                temperature: 0.7,
                max_tokens: 150,
                timeout_ms: config.cloud_timeout_ms,
            },
            local: ModelConfig {
                provider: Provider::Local,
                vendor: Vendor::Ollama,
                model_name: config.local_model.clone(),
                endpoint: Some(config.local_endpoint.clone()),
                temperature: 0.7,
                max_tokens: 150,
                timeout_ms: config.local_timeout_ms,
            },
            backend,
        }
    }

    pub fn cloud_config(&self) -> &ModelConfig {
        &self.cloud_primary
    }

    pub fn local_config(&self) -> &ModelConfig {
        &self.local
    }

    /// First matching rule wins
    pub fn select(&self, complexity: ComplexityTier, is_online: bool) -> ModelConfig {
        let chosen = match complexity {
            ComplexityTier::Simple if !is_online => &self.local,
            ComplexityTier::Complex | ComplexityTier::MultiAgent if is_online => &self.cloud_primary,
            ComplexityTier::Complex | ComplexityTier::MultiAgent => &self.local,
            _ if is_online => &self.cloud_primary,
            _ => &self.local,
        };

        debug!(?complexity, is_online, vendor = %chosen.vendor, "Model selected");
        chosen.clone()
    }

    /// Next config in the chain; local is terminal
    pub fn fallback(&self, config: &ModelConfig) -> ModelConfig {
        match config.vendor {
            Vendor::OpenAi => self.cloud_fallback.clone(),
            Vendor::Google | Vendor::Ollama => self.local.clone(),
        }
    }

    pub fn is_cloud(config: &ModelConfig) -> bool {
        config.provider == Provider::Cloud
    }

    /// Zero-confidence result for a query that produced no reply
    pub fn unanswered(config: &ModelConfig, latency_ms: u64) -> InferenceResult {
        InferenceResult {
            text: String::new(),
            language: Language::En,
            confidence: 0.0,
            provider_used: config.vendor,
            latency_ms,
        }
    }

    /// Query one backend, bounded by `config.timeout_ms`
    pub async fn query(&self, config: &ModelConfig, prompt: &str) -> InferenceResult {
        let start = Instant::now();
        let timeout = Duration::from_millis(config.timeout_ms);

        let text = match tokio::time::timeout(timeout, self.backend.generate(prompt, config)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(vendor = %config.vendor, error = %e, "Inference backend failed");
                String::new()
            }
            Err(_) => {
                warn!(vendor = %config.vendor, timeout_ms = config.timeout_ms, "Inference backend timed out");
                String::new()
            }
        };

        let confidence = if text.trim().is_empty() { 0.0 } else { BACKEND_CONFIDENCE };

        InferenceResult {
            language: detect_language(&text),
            text,
            confidence,
            provider_used: config.vendor,
            latency_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Query along the fallback chain until a backend answers or local has been tried
    pub async fn query_with_fallback(&self, config: &ModelConfig, prompt: &str) -> InferenceResult {
        let mut current = config.clone();

        loop {
            let result = self.query(&current, prompt).await;
            if result.confidence > 0.0 {
                info!(vendor = %result.provider_used, latency_ms = result.latency_ms, "Inference reply received");
                return result;
            }

            let next = self.fallback(&current);
            if next == current {
                return result;
            }

            debug!(from = %current.vendor, to = %next.vendor, "Falling back to next backend");
            current = next;
        }
    }
}

/// Deterministic offline replies keyed on the prompt's verb
pub struct CannedInferenceBackend {
    delay: Duration,
}

impl CannedInferenceBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for CannedInferenceBackend {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait::async_trait]
impl InferenceBackend for CannedInferenceBackend {
    async fn generate(&self, prompt: &str, _config: &ModelConfig) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let lowered = prompt.to_lowercase();
        let reply = if lowered.contains("open") {
            "I'll open the application for you"
        } else if lowered.contains("create") {
            "Creating a new file in the specified location"
        } else if lowered.contains("delete") {
            "Deleting the file and sending to recycle bin"
        } else {
            "Processing your request"
        };

        Ok(reply.to_string())
    }
}
