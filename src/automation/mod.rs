//! Automation backend boundary
//!
//! The coordinator decides what runs and in what order; an executor performs
//! the side effect. `SimulatedExecutor` keeps the pipeline usable without a
//! backend, `HttpStepExecutor` talks to an automation service.

use crate::error::AssistantError;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// One step invocation sent to the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    pub action: String,
    pub params: Value,
}

/// Backend reply for a step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Trait for a step executor (one call per step)
#[async_trait::async_trait]
pub trait StepExecutor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, request: &StepRequest) -> Result<StepOutcome>;
}

/// Executor that acknowledges every step after an optional delay
pub struct SimulatedExecutor {
    delay: Duration,
}

impl SimulatedExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait::async_trait]
impl StepExecutor for SimulatedExecutor {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn execute(&self, request: &StepRequest) -> Result<StepOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(StepOutcome {
            success: true,
            message: Some(format!("Executed: {}", request.action)),
            data: Some(json!({ "action": request.action })),
        })
    }
}

/// Executor backed by an HTTP automation service (`POST {base}/execute`)
#[derive(Clone)]
pub struct HttpStepExecutor {
    client: Client,
    base_url: String,
}

impl HttpStepExecutor {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl StepExecutor for HttpStepExecutor {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn execute(&self, request: &StepRequest) -> Result<StepOutcome> {
        let url = format!("{}/execute", self.base_url);
        debug!(action = %request.action, %url, "Dispatching step to automation backend");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AssistantError::Backend(format!(
                    "Automation request failed for {}: {}",
                    request.action, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Backend(format!(
                "Automation backend returned {} for {}: {}",
                status, request.action, body
            )));
        }

        response
            .json::<StepOutcome>()
            .await
            .map_err(|e| AssistantError::Backend(format!("Invalid automation response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_executor_acknowledges() {
        let executor = SimulatedExecutor::default();
        let outcome = executor
            .execute(&StepRequest {
                action: "app.locate".to_string(),
                params: json!({ "target": "notepad" }),
            })
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Executed: app.locate"));
    }

    #[test]
    fn test_outcome_tolerates_missing_fields() {
        let outcome: StepOutcome = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.is_none());
        assert!(outcome.data.is_none());
    }

    #[test]
    fn test_http_executor_trims_base_url() {
        let executor = HttpStepExecutor::new("http://localhost:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(executor.base_url, "http://localhost:9000");
    }
}
