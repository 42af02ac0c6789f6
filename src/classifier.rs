//! Intent and complexity classification
//!
//! Maps raw command text to:
//! - an intent category, chosen by a static `(category, pattern)` rule table
//! - an action verb from a per-category whitelist
//! - typed entities (file names, apps, paths, `--key[=value]` parameters)
//! - a complexity tier derived from entity count and confidence

use crate::models::{ComplexityTier, Entity, Intent, IntentCategory, ParsedCommand, Priority};
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

/// Confidence when no rule matches
pub const UNKNOWN_CONFIDENCE: f32 = 0.5;

/// Below this an intent must be confirmed by the caller
pub const CONFIRMATION_THRESHOLD: f32 = 0.8;

pub const FILE_ENTITY_CONFIDENCE: f32 = 0.9;
pub const APP_ENTITY_CONFIDENCE: f32 = 0.95;
pub const PATH_ENTITY_CONFIDENCE: f32 = 0.9;
pub const PARAMETER_ENTITY_CONFIDENCE: f32 = 0.8;

/// Phrases that make a command a power-state change
pub const SHUTDOWN_WORDS: &[&str] = &["shutdown", "shut down", "restart", "reboot"];

/// A single classification rule with its fixed match confidence
pub struct IntentRule {
    pub category: IntentCategory,
    pub pattern: Regex,
    pub confidence: f32,
}

fn rule(category: IntentCategory, pattern: &str, confidence: f32) -> IntentRule {
    IntentRule {
        category,
        pattern: Regex::new(pattern).expect("invalid intent pattern"),
        confidence,
    }
}

lazy_static! {
    /// Registration order breaks confidence ties (first wins).
    static ref INTENT_RULES: Vec<IntentRule> = vec![
        // File operations
        rule(IntentCategory::FileOp, r"(?i)\b(create|make|new|open|read|delete|remove|trash|copy|duplicate|move|rename|search|find)\s+(the\s+|a\s+|an\s+)?(file|document)", 0.93),
        rule(IntentCategory::FileOp, r"(?i)\b(create|make|open|read|delete|remove|trash|copy|duplicate|move|rename|search|find)\s+[a-zA-Z0-9_.-]+\.[a-zA-Z]{2,4}\b", 0.92),
        // App control
        rule(IntentCategory::AppControl, r"(?i)\b(open|launch|start)\s+\w+", 0.90),
        rule(IntentCategory::AppControl, r"(?i)\b(close|quit|exit|stop)\s+\w+", 0.90),
        rule(IntentCategory::AppControl, r"(?i)\b(focus|switch|activate)\s+\w+", 0.88),
        rule(IntentCategory::AppControl, r"(?i)\b(minimize|maximize|resize)\s+\w+", 0.88),
        // System queries
        rule(IntentCategory::SystemQuery, r"(?i)\b(what|how much|how many)\s+(is|are)\s+", 0.87),
        rule(IntentCategory::SystemQuery, r"(?i)\b(list|show|display)\s+(me\s+)?(the\s+)?(running|installed|available)\s+", 0.91),
        rule(IntentCategory::SystemQuery, r"(?i)\b(check|verify|status)\s+", 0.86),
        // Voice
        rule(IntentCategory::VoiceCommand, r"(?i)\b(hey dev|ok dev|listen)", 0.94),
        // Settings
        rule(IntentCategory::Settings, r"(?i)\b(set|configure|change|update|modify)\s+(the\s+)?(setting|preference|language)", 0.92),
        rule(IntentCategory::Settings, r"(?i)\b(enable|disable|turn on|turn off)\s+", 0.89),
    ];

    static ref FILE_NAME: Regex = Regex::new(r"\b[a-zA-Z0-9_.-]+\.[a-zA-Z]{2,4}\b").expect("invalid entity pattern");
    static ref APP_NAME: Regex = Regex::new(r"(?i)\b(Word|Excel|PowerPoint|Chrome|Firefox|VS Code|Notepad)\b").expect("invalid entity pattern");
    static ref PATH: Regex = Regex::new(r"\b[C-Z]:\\[\\/\w.-]*|(?:^|\s)(/[\w.-]+)+").expect("invalid entity pattern");
    static ref PARAMETER: Regex = Regex::new(r"--(\w+)(?:=(\S+))?").expect("invalid entity pattern");
}

/// Per-category action whitelists, scanned in order.
fn action_words(category: IntentCategory) -> &'static [&'static str] {
    match category {
        IntentCategory::FileOp => &["create", "open", "delete", "copy", "move", "search"],
        IntentCategory::AppControl => &["open", "close", "focus", "minimize", "maximize"],
        IntentCategory::SystemQuery => &["list", "check", "verify", "status", "show"],
        IntentCategory::VoiceCommand => &["listen", "acknowledge"],
        IntentCategory::Settings => &["set", "configure", "enable", "disable", "change"],
        IntentCategory::Unknown => &[],
    }
}

/// Intent classifier over the static rule table
pub struct IntentClassifier;

impl IntentClassifier {
    /// Classify free text into an intent with entities and confidence
    pub fn classify(text: &str) -> Intent {
        let (category, confidence) = match Self::best_rule(text) {
            Some(rule) => (rule.category, rule.confidence),
            None => (IntentCategory::Unknown, UNKNOWN_CONFIDENCE),
        };

        Intent {
            category,
            action: extract_action(text, category),
            entities: extract_entities(text),
            confidence,
            requires_confirmation: confidence < CONFIRMATION_THRESHOLD,
        }
    }

    /// Highest-confidence matching rule; strict `>` keeps the first registered on ties.
    pub fn best_rule(text: &str) -> Option<&'static IntentRule> {
        let mut best: Option<&'static IntentRule> = None;

        for rule in INTENT_RULES.iter() {
            if !rule.pattern.is_match(text) {
                continue;
            }
            match best {
                Some(current) if rule.confidence <= current.confidence => {}
                _ => best = Some(rule),
            }
        }

        best
    }

    /// Full parse: intent, complexity and the approval flag
    pub fn parse(text: &str) -> ParsedCommand {
        let intent = Self::classify(text);
        let complexity = classify_complexity(intent.entities.len(), intent.confidence);
        let requires_approval =
            intent.requires_confirmation || complexity == ComplexityTier::Complex;

        ParsedCommand {
            text: text.to_string(),
            intent,
            complexity,
            requires_approval,
            timestamp: Utc::now(),
        }
    }
}

/// Run every entity matcher independently; all matches are kept.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();

    let mut push = |kind: &str, value: &str, confidence: f32| {
        entities.push(Entity {
            kind: kind.to_string(),
            value: value.to_string(),
            confidence,
        });
    };

    for m in FILE_NAME.find_iter(text) {
        push("file", m.as_str(), FILE_ENTITY_CONFIDENCE);
    }

    for m in APP_NAME.find_iter(text) {
        push("app", m.as_str(), APP_ENTITY_CONFIDENCE);
    }

    for m in PATH.find_iter(text) {
        push("path", m.as_str().trim(), PATH_ENTITY_CONFIDENCE);
    }

    for caps in PARAMETER.captures_iter(text) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or_default();
        push("parameter", value, PARAMETER_ENTITY_CONFIDENCE);
    }

    entities
}

/// First whitelisted verb that appears (case-insensitive) in the text
pub fn extract_action(text: &str, category: IntentCategory) -> String {
    let lowered = text.to_lowercase();

    action_words(category)
        .iter()
        .find(|verb| lowered.contains(**verb))
        .map(|verb| verb.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Pure four-rule complexity table
pub fn classify_complexity(entity_count: usize, confidence: f32) -> ComplexityTier {
    if entity_count == 0 && confidence > 0.8 {
        ComplexityTier::Simple
    } else if entity_count <= 2 && confidence > 0.7 {
        ComplexityTier::Moderate
    } else if entity_count <= 4 {
        ComplexityTier::Complex
    } else {
        ComplexityTier::MultiAgent
    }
}

pub fn priority_for(complexity: ComplexityTier) -> Priority {
    match complexity {
        ComplexityTier::Simple => Priority::Low,
        ComplexityTier::Moderate => Priority::Medium,
        ComplexityTier::Complex => Priority::High,
        ComplexityTier::MultiAgent => Priority::Critical,
    }
}
