//! Voice Command Orchestrator
//!
//! A desktop-assistant command pipeline that:
//! - Classifies free text into intents with extracted entities
//! - Gates actions through a role-based permission table
//! - Decomposes commands into validated step graphs
//! - Runs steps concurrently on capability agents with timeouts and deadlines
//! - Picks a cloud or local inference backend with a fallback chain
//! - Renders bilingual (English / Hindi) responses and logs every command
//!
//! PIPELINE:
//! TEXT → CLASSIFY → PERMIT? → DECOMPOSE → CHECK PLAN → EXECUTE ∥ INFER → RENDER → LOG

pub mod audit;
pub mod automation;
pub mod classifier;
pub mod config;
pub mod error;
pub mod execution;
pub mod inference;
pub mod models;
pub mod permissions;
pub mod pipeline;
pub mod planner;
pub mod response;

pub use error::{AssistantError, Result};

// Re-export common types
pub use models::*;
pub use classifier::IntentClassifier;
pub use config::AssistantConfig;
pub use pipeline::Assistant;
