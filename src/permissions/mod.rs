//! Permission gate
//!
//! Policy-table lookup for single actions plus rules-based plan safety checks.
//! Actions without a policy are allowed with no approval (fail-open default).

use crate::classifier::{extract_action, SHUTDOWN_WORDS};
use crate::models::{
    ExecutionPlan, ExecutionStep, Intent, IntentCategory, PermissionDecision, PermissionPolicy,
    PlanSafety, RiskLevel, ROLE_ADMIN,
};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Bulk-destruction phrasing that blocks a step regardless of role
const DESTRUCTIVE_PATTERNS: &[&str] = &[
    "delete all",
    "remove all",
    "erase all",
    "wipe",
    "format drive",
    "rm -rf",
];

/// Trait for plan safety rules
pub trait PlanRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, step: &ExecutionStep, role: &str) -> RuleFinding;
}

#[derive(Debug, Default)]
pub struct RuleFinding {
    pub risk: Option<String>,
    pub blocks: bool,
}

impl RuleFinding {
    fn pass() -> Self {
        Self::default()
    }

    fn advisory(risk: String) -> Self {
        Self { risk: Some(risk), blocks: false }
    }

    fn blocking(risk: String) -> Self {
        Self { risk: Some(risk), blocks: true }
    }
}

/// Gate owning the policy table and plan rules for the process lifetime
pub struct PermissionGate {
    policies: HashMap<String, PermissionPolicy>,
    rules: Vec<Box<dyn PlanRule>>,
}

impl PermissionGate {
    /// Empty gate: every action allowed, no plan rules
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn add_policy(&mut self, policy: PermissionPolicy) {
        self.policies.insert(policy.action.clone(), policy);
    }

    pub fn remove_policy(&mut self, action: &str) -> Option<PermissionPolicy> {
        self.policies.remove(action)
    }

    pub fn add_rule(&mut self, rule: Box<dyn PlanRule>) {
        self.rules.push(rule);
    }

    pub fn policy(&self, action: &str) -> Option<&PermissionPolicy> {
        self.policies.get(action)
    }

    /// All policies, sorted by action name
    pub fn policies(&self) -> Vec<&PermissionPolicy> {
        let mut all: Vec<_> = self.policies.values().collect();
        all.sort_by(|a, b| a.action.cmp(&b.action));
        all
    }

    /// Check a single action for a caller role
    pub fn validate(&self, action: &str, role: &str) -> PermissionDecision {
        let Some(policy) = self.policies.get(action) else {
            debug!(action, "No policy found - allowing by default");
            return PermissionDecision {
                allowed: true,
                requires_approval: false,
                reason: format!("No policy for '{}' - allowed by default", action),
            };
        };

        if !policy.allowed_roles.contains(role) {
            info!(action, role, "Permission denied");
            return PermissionDecision {
                allowed: false,
                requires_approval: false,
                reason: format!("Role '{}' is not authorized for '{}'", role, action),
            };
        }

        PermissionDecision {
            allowed: true,
            requires_approval: policy.requires_approval,
            reason: format!("Role '{}' authorized for '{}'", role, action),
        }
    }

    /// Run every plan rule over every step
    pub fn validate_plan(&self, plan: &ExecutionPlan, role: &str) -> PlanSafety {
        let mut risks = Vec::new();
        let mut blocked: Vec<String> = Vec::new();

        for step in &plan.steps {
            for rule in &self.rules {
                let finding = rule.check(step, role);

                if let Some(risk) = finding.risk {
                    debug!(rule = rule.name(), step_id = %step.id, blocks = finding.blocks, "Plan rule flagged step");
                    risks.push(risk);
                }
                if finding.blocks && !blocked.contains(&step.id) {
                    blocked.push(step.id.clone());
                }
            }
        }

        let safe = blocked.is_empty();

        if !safe {
            warn!(
                command_id = %plan.command_id,
                blocked_steps = ?blocked,
                "Plan blocked by safety rules"
            );
        }

        PlanSafety {
            safe,
            risks,
            blocked_steps: blocked,
        }
    }
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an intent to the `domain:verb` action name the policy table is keyed by
pub fn permission_action(intent: &Intent, text: &str) -> String {
    let lowered = text.to_lowercase();
    if SHUTDOWN_WORDS.iter().any(|w| lowered.contains(w)) {
        return "system:shutdown".to_string();
    }

    match intent.category {
        IntentCategory::FileOp => format!("file:{}", intent.action),
        IntentCategory::AppControl => format!("app:{}", intent.action),
        IntentCategory::SystemQuery => "system:query".to_string(),
        IntentCategory::Settings => "settings:change".to_string(),
        IntentCategory::VoiceCommand => format!("voice:{}", intent.action),
        IntentCategory::Unknown => {
            format!("unknown:{}", extract_action(text, IntentCategory::Unknown))
        }
    }
}

//
// ================= RiskLevel Ordering =================
//

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl RiskLevel {
    fn rank(&self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        }
    }

    pub fn needs_approval(&self) -> bool {
        *self >= RiskLevel::High
    }
}

//
// ================= Plan Rules =================
//

/// Critical steps are reported but never blocked
pub struct CriticalRiskRule;

impl PlanRule for CriticalRiskRule {
    fn name(&self) -> &'static str {
        "critical_risk_advisory"
    }

    fn check(&self, step: &ExecutionStep, _role: &str) -> RuleFinding {
        if step.risk_level == RiskLevel::Critical {
            RuleFinding::advisory(format!("Critical risk in step: {}", step.description))
        } else {
            RuleFinding::pass()
        }
    }
}

/// High-risk steps need the admin role
pub struct HighRiskRoleRule;

impl PlanRule for HighRiskRoleRule {
    fn name(&self) -> &'static str {
        "high_risk_requires_admin"
    }

    fn check(&self, step: &ExecutionStep, role: &str) -> RuleFinding {
        if step.risk_level == RiskLevel::High && role != ROLE_ADMIN {
            RuleFinding::blocking(format!(
                "High risk operation requires admin role: {}",
                step.description
            ))
        } else {
            RuleFinding::pass()
        }
    }
}

/// Denylist of bulk-destructive phrasing in a step's description or the
/// command text it carries in `params.text`
pub struct DestructivePatternRule;

impl PlanRule for DestructivePatternRule {
    fn name(&self) -> &'static str {
        "destructive_pattern_denylist"
    }

    fn check(&self, step: &ExecutionStep, _role: &str) -> RuleFinding {
        let description = step.description.to_lowercase();
        let command_text = step
            .params
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if DESTRUCTIVE_PATTERNS
            .iter()
            .any(|p| description.contains(p) || command_text.contains(p))
        {
            RuleFinding::blocking(format!(
                "Dangerous operation detected: {}",
                step.description
            ))
        } else {
            RuleFinding::pass()
        }
    }
}

fn policy(action: &str, roles: &[&str], requires_approval: bool, risk_level: RiskLevel) -> PermissionPolicy {
    PermissionPolicy {
        action: action.to_string(),
        allowed_roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
        requires_approval,
        risk_level,
    }
}

/// Create a gate with the standard policy table and plan rules
pub fn create_default_permission_gate() -> PermissionGate {
    let mut gate = PermissionGate::new();

    gate.add_policy(policy("file:create", &["user", "admin"], false, RiskLevel::Low));
    gate.add_policy(policy("file:delete", &["admin"], true, RiskLevel::High));
    gate.add_policy(policy("app:open", &["user", "admin"], false, RiskLevel::Low));
    gate.add_policy(policy("app:close", &["user", "admin"], false, RiskLevel::Low));
    gate.add_policy(policy("system:query", &["user", "admin"], false, RiskLevel::Low));
    gate.add_policy(policy("system:shutdown", &["admin"], true, RiskLevel::Critical));
    gate.add_policy(policy("settings:change", &["user", "admin"], false, RiskLevel::Low));

    gate.add_rule(Box::new(CriticalRiskRule));
    gate.add_rule(Box::new(HighRiskRoleRule));
    gate.add_rule(Box::new(DestructivePatternRule));

    gate
}

//
// ================= Tests =================
//
