//! Task decomposition
//!
//! Turns a command into a validated step graph. Plans are only built through
//! `ExecutionPlan::new`, so a malformed graph never reaches the coordinator.

use crate::classifier::{extract_entities, priority_for, SHUTDOWN_WORDS};
use crate::error::AssistantError;
use crate::models::{Capability, ComplexityTier, ExecutionPlan, ExecutionStep, Priority, RiskLevel};
use crate::Result;
use serde_json::json;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Maximum steps allowed per plan
pub const MAX_STEPS_PER_PLAN: usize = 50;

/// Cost of one serial step in the duration estimate
pub const STEP_DURATION_MS: u64 = 500;

const FILE_KEYWORDS: &[&str] = &["file", "files", "document", "documents", "folder", "directory"];
const APP_KEYWORDS: &[&str] = &[
    "app", "apps", "application", "applications",
    "open", "launch", "start", "close", "quit", "exit",
    "word", "excel", "powerpoint", "chrome", "firefox", "notepad", "vscode",
];
const VOICE_PHRASES: &[&str] = &["hey dev", "ok dev", "listen", "speak"];
const DELETION_VERBS: &[&str] = &["delete", "remove", "trash", "erase"];
const FILE_VERBS: &[&str] = &["create", "open", "delete", "remove", "copy", "move", "rename", "search", "read"];

/// Trait for plan generation
pub trait Decomposer: Send + Sync {
    fn decompose(
        &self,
        command_id: &str,
        text: &str,
        complexity: ComplexityTier,
    ) -> Result<ExecutionPlan>;
}

impl ExecutionPlan {
    /// Validate the step graph and derive the schedule estimates.
    pub fn new(
        command_id: impl Into<String>,
        steps: Vec<ExecutionStep>,
        priority: Priority,
    ) -> Result<Self> {
        validate_steps(&steps)?;

        let parallelizable = steps.iter().all(|s| s.dependencies.is_empty());

        let estimated_duration_ms = if parallelizable {
            STEP_DURATION_MS
        } else {
            steps.len() as u64 * STEP_DURATION_MS
        };

        let required_approvals = steps
            .iter()
            .filter(|s| s.risk_level.needs_approval())
            .map(|s| s.id.clone())
            .collect();

        Ok(Self {
            command_id: command_id.into(),
            steps,
            estimated_duration_ms,
            required_approvals,
            parallelizable,
            priority,
        })
    }

    /// Re-check a plan that may not have come through `new`
    /// (deserialized or built as a literal).
    pub fn validate(&self) -> Result<()> {
        validate_steps(&self.steps)
    }
}

/// Rejects empty or duplicate ids, dependencies that are not declared
/// earlier in the list (which also rules out cycles), and oversized plans.
fn validate_steps(steps: &[ExecutionStep]) -> Result<()> {
    if steps.len() > MAX_STEPS_PER_PLAN {
        return Err(AssistantError::InvalidPlan(format!(
            "Plan exceeds maximum allowed steps ({})",
            MAX_STEPS_PER_PLAN
        )));
    }

    let mut declared: HashSet<&str> = HashSet::with_capacity(steps.len());

    for step in steps {
        if step.id.trim().is_empty() {
            return Err(AssistantError::InvalidPlan("Step id cannot be empty".to_string()));
        }

        for dep in &step.dependencies {
            if dep == &step.id {
                return Err(AssistantError::InvalidPlan(format!(
                    "Step '{}' depends on itself",
                    step.id
                )));
            }
            if !declared.contains(dep.as_str()) {
                return Err(AssistantError::InvalidPlan(format!(
                    "Step '{}' depends on '{}', which is not declared before it",
                    step.id, dep
                )));
            }
        }

        if !declared.insert(step.id.as_str()) {
            return Err(AssistantError::InvalidPlan(format!(
                "Duplicate step id '{}'",
                step.id
            )));
        }
    }

    Ok(())
}

/// Keyword-routed decomposer producing two-step dependent chains
pub struct KeywordDecomposer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    File,
    App,
    Voice,
    System,
}

impl KeywordDecomposer {
    fn route(lowered: &str) -> Domain {
        let words: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '.' || c == '_' || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |list: &[&str]| words.iter().any(|w| list.contains(w));

        let has_file_token = extract_entities(lowered).iter().any(|e| e.kind == "file");

        if has_word(FILE_KEYWORDS) || has_file_token {
            Domain::File
        } else if has_word(APP_KEYWORDS) || lowered.contains("vs code") {
            Domain::App
        } else if VOICE_PHRASES.iter().any(|p| lowered.contains(p)) {
            Domain::Voice
        } else {
            Domain::System
        }
    }

    fn build_steps(text: &str) -> Vec<ExecutionStep> {
        let lowered = text.to_lowercase();
        let target = extract_entities(text)
            .into_iter()
            .find(|e| e.kind == "file" || e.kind == "app")
            .map(|e| e.value);

        match Self::route(&lowered) {
            Domain::File => {
                let verb = first_of(&lowered, FILE_VERBS).unwrap_or("process");
                let perform_risk = if first_of(&lowered, DELETION_VERBS).is_some() {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                };

                chain(
                    Capability::FileOperations,
                    ("Validate file permissions", "file.validate_permissions", RiskLevel::Low),
                    (&format!("Perform file operation: {}", verb), "file.perform", perform_risk),
                    json!({ "verb": verb, "target": target, "text": text }),
                )
            }
            Domain::App => chain(
                Capability::AppControl,
                ("Locate application", "app.locate", RiskLevel::Low),
                ("Control application", "app.control", RiskLevel::Low),
                json!({
                    "verb": first_of(&lowered, &["open", "launch", "start", "close", "quit", "exit"]).unwrap_or("open"),
                    "target": target,
                    "text": text,
                }),
            ),
            Domain::Voice => chain(
                Capability::VoiceIo,
                ("Activate voice system", "voice.activate", RiskLevel::Low),
                ("Listen for input", "voice.listen", RiskLevel::Low),
                json!({ "text": text }),
            ),
            Domain::System => {
                let query_risk = if first_of(&lowered, SHUTDOWN_WORDS).is_some() {
                    RiskLevel::Critical
                } else {
                    RiskLevel::Low
                };

                chain(
                    Capability::SystemQueries,
                    ("Query system", "system.query", query_risk),
                    ("Format response", "system.format", RiskLevel::Low),
                    json!({ "text": text }),
                )
            }
        }
    }
}

impl Decomposer for KeywordDecomposer {
    fn decompose(
        &self,
        command_id: &str,
        text: &str,
        complexity: ComplexityTier,
    ) -> Result<ExecutionPlan> {
        let steps = Self::build_steps(text);
        let plan = ExecutionPlan::new(command_id, steps, priority_for(complexity))?;

        debug!(
            command_id,
            step_count = plan.steps.len(),
            parallelizable = plan.parallelizable,
            estimated_ms = plan.estimated_duration_ms,
            "Plan decomposed"
        );

        Ok(plan)
    }
}

fn first_of<'a>(lowered: &str, words: &[&'a str]) -> Option<&'a str> {
    words.iter().copied().find(|w| lowered.contains(w))
}

/// `step_1 -> step_2` on one capability; both steps share `params`
fn chain(
    capability: Capability,
    first: (&str, &str, RiskLevel),
    second: (&str, &str, RiskLevel),
    params: serde_json::Value,
) -> Vec<ExecutionStep> {
    let with_action = |action: &str| {
        let mut p = params.clone();
        if let Some(obj) = p.as_object_mut() {
            obj.insert("action".to_string(), json!(action));
        }
        p
    };

    vec![
        ExecutionStep {
            id: "step_1".to_string(),
            description: first.0.to_string(),
            required_capability: capability,
            dependencies: BTreeSet::new(),
            risk_level: first.2,
            params: with_action(first.1),
        },
        ExecutionStep {
            id: "step_2".to_string(),
            description: second.0.to_string(),
            required_capability: capability,
            dependencies: BTreeSet::from(["step_1".to_string()]),
            risk_level: second.2,
            params: with_action(second.1),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, deps: &[&str]) -> ExecutionStep {
        ExecutionStep {
            id: id.to_string(),
            description: format!("step {}", id),
            required_capability: Capability::SystemQueries,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            risk_level: RiskLevel::Low,
            params: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_app_command_yields_dependent_app_chain() {
        let plan = KeywordDecomposer
            .decompose("cmd_1", "open notepad", ComplexityTier::Moderate)
            .unwrap();

        assert_eq!(plan.steps.len(), 2);
        assert!(plan.steps.iter().all(|s| s.required_capability == Capability::AppControl));
        assert!(plan.steps[1].dependencies.contains("step_1"));
        assert!(!plan.parallelizable);
        assert_eq!(plan.estimated_duration_ms, 1000);
        assert!(plan.required_approvals.is_empty());
        assert_eq!(plan.priority, Priority::Medium);
        assert_eq!(plan.steps[1].params["target"], "notepad");
    }

    #[test]
    fn test_file_delete_needs_approval() {
        let plan = KeywordDecomposer
            .decompose("cmd_2", "delete report.pdf", ComplexityTier::Moderate)
            .unwrap();

        assert!(plan.steps.iter().all(|s| s.required_capability == Capability::FileOperations));
        assert_eq!(plan.steps[1].risk_level, RiskLevel::High);
        assert_eq!(plan.required_approvals, vec!["step_2"]);
        assert_eq!(plan.steps[1].params["verb"], "delete");
        assert_eq!(plan.steps[1].params["action"], "file.perform");
    }

    #[test]
    fn test_routing_fallbacks() {
        let voice = KeywordDecomposer.decompose("c", "hey dev", ComplexityTier::Simple).unwrap();
        assert_eq!(voice.steps[0].required_capability, Capability::VoiceIo);

        let system = KeywordDecomposer
            .decompose("c", "how much memory is free", ComplexityTier::Simple)
            .unwrap();
        assert_eq!(system.steps[0].required_capability, Capability::SystemQueries);

        let shutdown = KeywordDecomposer.decompose("c", "reboot now", ComplexityTier::Simple).unwrap();
        assert_eq!(shutdown.steps[0].risk_level, RiskLevel::Critical);
        assert_eq!(shutdown.required_approvals, vec!["step_1"]);

        let spaced = KeywordDecomposer
            .decompose("c", "shut down the pc", ComplexityTier::Simple)
            .unwrap();
        assert_eq!(spaced.steps[0].risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_decompose_never_produces_invalid_graph() {
        let inputs = ["", "open chrome", "create file notes.txt", "listen", "status of disk"];

        for text in inputs {
            let plan = KeywordDecomposer.decompose("c", text, ComplexityTier::Complex).unwrap();
            // Re-validating an emitted plan must succeed.
            assert!(ExecutionPlan::new("c", plan.steps.clone(), plan.priority).is_ok());
        }
    }

    #[test]
    fn test_forward_reference_rejected() {
        let result = ExecutionPlan::new(
            "cmd",
            vec![step("a", &["b"]), step("b", &[])],
            Priority::Low,
        );
        assert!(matches!(result, Err(AssistantError::InvalidPlan(_))));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let result = ExecutionPlan::new("cmd", vec![step("a", &["ghost"])], Priority::Low);
        assert!(matches!(result, Err(AssistantError::InvalidPlan(_))));
    }

    #[test]
    fn test_self_reference_and_duplicates_rejected() {
        assert!(ExecutionPlan::new("cmd", vec![step("a", &["a"])], Priority::Low).is_err());
        assert!(ExecutionPlan::new("cmd", vec![step("a", &[]), step("a", &[])], Priority::Low).is_err());
    }

    #[test]
    fn test_independent_steps_are_parallelizable() {
        let plan = ExecutionPlan::new(
            "cmd",
            vec![step("a", &[]), step("b", &[]), step("c", &[])],
            Priority::Low,
        )
        .unwrap();

        assert!(plan.parallelizable);
        assert_eq!(plan.estimated_duration_ms, STEP_DURATION_MS);
    }

    #[test]
    fn test_oversized_plan_rejected() {
        let steps = (0..=MAX_STEPS_PER_PLAN).map(|i| step(&format!("s{}", i), &[])).collect();
        assert!(ExecutionPlan::new("cmd", steps, Priority::Low).is_err());
    }
}
