//! Environment-driven configuration
//!
//! Every value has a default so the assistant runs with an empty environment.
//! Call `dotenv::dotenv().ok()` before `from_env` to pick up a `.env` file.

use crate::error::AssistantError;
use crate::Result;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub cloud_model: String,
    pub cloud_endpoint: Option<String>,
    pub fallback_model: String,
    pub local_model: String,
    pub local_endpoint: String,
    pub cloud_timeout_ms: u64,
    pub local_timeout_ms: u64,
    pub step_timeout_ms: u64,
    pub max_workers: usize,
    pub automation_base_url: Option<String>,
    pub inference_base_url: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            cloud_model: "gpt-3.5-turbo".to_string(),
            cloud_endpoint: None,
            fallback_model: "gemini-pro".to_string(),
            local_model: "mistral".to_string(),
            local_endpoint: "http://localhost:11434".to_string(),
            cloud_timeout_ms: 5000,
            local_timeout_ms: 3000,
            step_timeout_ms: 2000,
            max_workers: 4,
            automation_base_url: None,
            inference_base_url: None,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let string_or = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
        };

        let max_workers: usize = parse_or(&lookup, "ASSISTANT_MAX_WORKERS", defaults.max_workers)?;

        Ok(Self {
            cloud_model: string_or("ASSISTANT_CLOUD_MODEL", defaults.cloud_model),
            cloud_endpoint: optional("ASSISTANT_CLOUD_ENDPOINT"),
            fallback_model: string_or("ASSISTANT_FALLBACK_MODEL", defaults.fallback_model),
            local_model: string_or("ASSISTANT_LOCAL_MODEL", defaults.local_model),
            local_endpoint: string_or("ASSISTANT_LOCAL_ENDPOINT", defaults.local_endpoint),
            cloud_timeout_ms: parse_or(&lookup, "ASSISTANT_CLOUD_TIMEOUT_MS", defaults.cloud_timeout_ms)?,
            local_timeout_ms: parse_or(&lookup, "ASSISTANT_LOCAL_TIMEOUT_MS", defaults.local_timeout_ms)?,
            step_timeout_ms: parse_or(&lookup, "ASSISTANT_STEP_TIMEOUT_MS", defaults.step_timeout_ms)?,
            max_workers: max_workers.max(1),
            automation_base_url: optional("AUTOMATION_BASE_URL"),
            inference_base_url: optional("INFERENCE_BASE_URL"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| {
            AssistantError::Config(format!("{} must be a number, got '{}'", key, raw))
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = AssistantConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AssistantConfig::default());
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = AssistantConfig::from_lookup(lookup_from(&[
            ("ASSISTANT_LOCAL_MODEL", "llama3"),
            ("ASSISTANT_STEP_TIMEOUT_MS", "750"),
            ("AUTOMATION_BASE_URL", "http://127.0.0.1:9000/"),
            ("ASSISTANT_MAX_WORKERS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.local_model, "llama3");
        assert_eq!(config.step_timeout_ms, 750);
        assert_eq!(config.automation_base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.max_workers, 1);
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let result = AssistantConfig::from_lookup(lookup_from(&[(
            "ASSISTANT_CLOUD_TIMEOUT_MS",
            "soon",
        )]));
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }
}
