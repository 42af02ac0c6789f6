//! End-to-end command pipeline
//!
//! TEXT → CLASSIFY → COMPLEXITY → PERMIT? → DECOMPOSE → CHECK PLAN → EXECUTE ∥ INFER → RENDER → LOG
//!
//! Denials and blocked plans short-circuit to a rendered response. Only an
//! empty command or a malformed plan escapes as an error.

use crate::audit::{CommandLog, CommandRecord};
use crate::automation::{HttpStepExecutor, SimulatedExecutor, StepExecutor};
use crate::classifier::IntentClassifier;
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::execution::AgentCoordinator;
use crate::inference::{CannedInferenceBackend, HttpInferenceBackend, InferenceBackend, ModelSelector};
use crate::models::{Command, CommandOutcome, CommandRequest, IntentCategory, Response};
use crate::permissions::{create_default_permission_gate, permission_action, PermissionGate};
use crate::planner::{Decomposer, KeywordDecomposer};
use crate::response::{detect_language, Outcome, ResponseRenderer};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

const STRIPPED_PUNCTUATION: &[char] = &[',', '!', '?', ';', ':', '\'', '"'];

/// Owns every pipeline component for the process lifetime
pub struct Assistant {
    gate: PermissionGate,
    decomposer: Box<dyn Decomposer>,
    coordinator: AgentCoordinator,
    selector: ModelSelector,
    command_log: Arc<dyn CommandLog>,
}

impl Assistant {
    pub fn new(
        gate: PermissionGate,
        decomposer: Box<dyn Decomposer>,
        coordinator: AgentCoordinator,
        selector: ModelSelector,
        command_log: Arc<dyn CommandLog>,
    ) -> Self {
        Self {
            gate,
            decomposer,
            coordinator,
            selector,
            command_log,
        }
    }

    /// Standard components; HTTP backends are used when their base URLs are configured
    pub fn from_config(config: &AssistantConfig, command_log: Arc<dyn CommandLog>) -> Result<Self> {
        let step_timeout = Duration::from_millis(config.step_timeout_ms);

        let executor: Arc<dyn StepExecutor> = match &config.automation_base_url {
            Some(url) => Arc::new(HttpStepExecutor::new(url, step_timeout)?),
            None => Arc::new(SimulatedExecutor::default()),
        };

        let backend: Arc<dyn InferenceBackend> = match &config.inference_base_url {
            Some(url) => Arc::new(HttpInferenceBackend::new(Some(url.clone()))?),
            None => Arc::new(CannedInferenceBackend::default()),
        };

        let coordinator = AgentCoordinator::new(executor)
            .with_step_timeout(step_timeout)
            .with_max_workers(config.max_workers);

        Ok(Self::new(
            create_default_permission_gate(),
            Box::new(KeywordDecomposer),
            coordinator,
            ModelSelector::new(config, backend),
            command_log,
        ))
    }

    pub fn coordinator(&self) -> &AgentCoordinator {
        &self.coordinator
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Run the full pipeline for one command
    pub async fn process(&self, request: CommandRequest) -> Result<CommandOutcome> {
        let started = Instant::now();
        let deadline = request
            .deadline_ms
            .map(|ms| tokio::time::Instant::now() + Duration::from_millis(ms));

        let command = build_command(&request)?;

        info!(
            command_id = %command.id,
            user_id = %command.user_id,
            source = ?command.source,
            "Processing command"
        );

        // === CLASSIFY ===
        let parsed = IntentClassifier::parse(&request.text);
        debug!(
            command_id = %command.id,
            category = %parsed.intent.category,
            action = %parsed.intent.action,
            confidence = parsed.intent.confidence,
            complexity = ?parsed.complexity,
            "Command classified"
        );

        // === PERMIT ===
        let action = permission_action(&parsed.intent, &request.text);
        let permission = self.gate.validate(&action, &request.caller_role);

        if !permission.allowed {
            let response = ResponseRenderer::render(
                &command.id,
                Outcome::Denied { reason: &permission.reason },
                command.language,
                request.source,
                started,
            );
            self.log(&command, &action, "denied").await;

            return Ok(CommandOutcome {
                command,
                parsed_command: parsed,
                permission,
                plan: None,
                plan_safety: None,
                execution: None,
                inference: None,
                response,
            });
        }

        // === DECOMPOSE ===
        let plan = self
            .decomposer
            .decompose(&command.id, &request.text, parsed.complexity)?;

        let safety = self.gate.validate_plan(&plan, &request.caller_role);
        if !safety.safe {
            let response = ResponseRenderer::render(
                &command.id,
                Outcome::Blocked { safety: &safety },
                command.language,
                request.source,
                started,
            );
            self.log(&command, &action, "blocked").await;

            return Ok(CommandOutcome {
                command,
                parsed_command: parsed,
                permission,
                plan: Some(plan),
                plan_safety: Some(safety),
                execution: None,
                inference: None,
                response,
            });
        }

        // === EXECUTE ∥ INFER ===
        let model = self.selector.select(parsed.complexity, request.is_online);
        let inference = async {
            let query = self.selector.query_with_fallback(&model, &request.text);
            match deadline {
                Some(at) => match tokio::time::timeout_at(at, query).await {
                    Ok(reply) => reply,
                    Err(_) => {
                        warn!(command_id = %command.id, "Deadline reached before inference replied");
                        ModelSelector::unanswered(&model, started.elapsed().as_millis() as u64)
                    }
                },
                None => query.await,
            }
        };
        let (execution, reply) =
            tokio::join!(self.coordinator.execute(&plan, deadline), inference);
        let execution = execution?;

        // === RENDER ===
        // A chat reply only stands in for a plan that ran cleanly.
        let chat = execution.success
            && parsed.intent.category == IntentCategory::Unknown
            && !reply.text.trim().is_empty();
        let outcome = if chat {
            Outcome::Chat { reply: &reply }
        } else {
            Outcome::Executed { execution: &execution }
        };
        let response =
            ResponseRenderer::render(&command.id, outcome, command.language, request.source, started);

        let status = if execution.success { "success" } else { "failed" };
        self.log(&command, &action, status).await;

        info!(
            command_id = %command.id,
            success = execution.success,
            latency_ms = response.latency_ms,
            "Command processed"
        );

        Ok(CommandOutcome {
            command,
            parsed_command: parsed,
            permission,
            plan: Some(plan),
            plan_safety: Some(safety),
            execution: Some(execution),
            inference: Some(reply),
            response,
        })
    }

    /// Like `process`, but every error becomes a generic failure response
    pub async fn respond(&self, request: CommandRequest) -> Response {
        let started = Instant::now();
        let source = request.source;
        let language = detect_language(&request.text);

        match self.process(request).await {
            Ok(outcome) => outcome.response,
            Err(e) => {
                warn!(error = %e, "Command processing failed");
                let command_id = format!("cmd_{}", Uuid::new_v4().simple());
                ResponseRenderer::render(&command_id, Outcome::Failed, language, source, started)
            }
        }
    }

    async fn log(&self, command: &Command, action: &str, outcome: &str) {
        let record = CommandRecord::new(
            &command.id,
            &command.user_id,
            &command.original_text,
            action,
            outcome,
        );

        if let Err(e) = self.command_log.record(record).await {
            warn!(command_id = %command.id, error = %e, "Failed to log command");
        }
    }
}

/// Validate and normalize an incoming request
pub fn build_command(request: &CommandRequest) -> Result<Command> {
    if request.text.trim().is_empty() {
        return Err(AssistantError::InvalidCommand(
            "Command text cannot be empty".to_string(),
        ));
    }

    Ok(Command {
        id: format!("cmd_{}", Uuid::new_v4().simple()),
        source: request.source,
        original_text: request.text.clone(),
        normalized_text: normalize_text(&request.text),
        user_id: request.user_id.clone(),
        language: detect_language(&request.text),
        timestamp: Utc::now(),
    })
}

/// Lowercase, collapse whitespace, drop punctuation; dots survive inside tokens
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            let kept: String = token
                .chars()
                .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
                .collect();
            kept.trim_matches('.').to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
