//! Error types for the command orchestrator

use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Step failed: {0}")]
    StepFailed(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Audit error: {0}")]
    Audit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}
