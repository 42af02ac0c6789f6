//! Core data models for the command orchestrator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role that may run high-risk steps
pub const ROLE_ADMIN: &str = "admin";

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    FileOp,
    AppControl,
    SystemQuery,
    VoiceCommand,
    Settings,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Simple,
    Moderate,
    Complex,
    MultiAgent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    FileOperations,
    AppControl,
    SystemQueries,
    VoiceIo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Busy,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandSource {
    Voice,
    Text,
    Gui,
    Api,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "hi")]
    Hi,
    #[serde(rename = "hi-en")]
    HiEn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Text,
    Speech,
    Hybrid,
}

//
// ================= Intent =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub kind: String,
    pub value: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub category: IntentCategory,
    pub action: String,
    pub entities: Vec<Entity>,
    pub confidence: f32,
    pub requires_confirmation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub text: String,
    pub intent: Intent,
    pub complexity: ComplexityTier,
    pub requires_approval: bool,
    pub timestamp: DateTime<Utc>,
}

//
// ================= Command =================
//

/// Input to the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub text: String,
    pub caller_role: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub is_online: bool,
    pub source: CommandSource,
    /// Processing budget; steps not started when it elapses are cancelled.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

fn default_user_id() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub source: CommandSource,
    pub original_text: String,
    pub normalized_text: String,
    pub user_id: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
}

//
// ================= Permissions =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionPolicy {
    pub action: String,
    pub allowed_roles: BTreeSet<String>,
    pub requires_approval: bool,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub requires_approval: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSafety {
    pub safe: bool,
    pub risks: Vec<String>,
    pub blocked_steps: Vec<String>,
}

//
// ================= Plan =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub capability: Capability,
    pub status: AgentStatus,
    pub priority: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id: String,
    pub description: String,
    pub required_capability: Capability,
    pub dependencies: BTreeSet<String>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Built only through `ExecutionPlan::new`, which rejects malformed graphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub command_id: String,
    pub steps: Vec<ExecutionStep>,
    pub estimated_duration_ms: u64,
    pub required_approvals: Vec<String>,
    pub parallelizable: bool,
    pub priority: Priority,
}

//
// ================= Execution =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    pub step_id: String,
    pub agent_id: Option<String>,
    pub success: bool,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn failed(step_id: &str, agent_id: Option<String>, error: &str) -> Self {
        Self {
            step_id: step_id.to_string(),
            agent_id,
            success: false,
            output: None,
            error: Some(error.to_string()),
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub results: Vec<StepResult>,
}

//
// ================= Inference =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Cloud,
    Local,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    OpenAi,
    Google,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub provider: Provider,
    pub vendor: Vendor,
    pub model_name: String,
    pub endpoint: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    pub text: String,
    pub language: Language,
    pub confidence: f32,
    pub provider_used: Vendor,
    pub latency_ms: u64,
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub command_id: String,
    pub text: String,
    pub language: Language,
    pub format: ResponseFormat,
    pub confidence: f32,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub command: Command,
    pub parsed_command: ParsedCommand,
    pub permission: PermissionDecision,
    pub plan: Option<ExecutionPlan>,
    pub plan_safety: Option<PlanSafety>,
    pub execution: Option<ExecutionResult>,
    pub inference: Option<InferenceResult>,
    pub response: Response,
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentCategory::FileOp => "file_op",
            IntentCategory::AppControl => "app_control",
            IntentCategory::SystemQuery => "system_query",
            IntentCategory::VoiceCommand => "voice_command",
            IntentCategory::Settings => "settings",
            IntentCategory::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::FileOperations => "file_operations",
            Capability::AppControl => "app_control",
            Capability::SystemQueries => "system_queries",
            Capability::VoiceIo => "voice_io",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::HiEn => "hi-en",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Vendor::OpenAi => "openai",
            Vendor::Google => "google",
            Vendor::Ollama => "ollama",
        };
        write!(f, "{}", s)
    }
}
