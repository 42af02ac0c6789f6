//! Response rendering
//!
//! Turns pipeline outcomes into localized text. Localization is a fixed
//! phrase table plus a lookup-based Hindi substitution; unknown text passes
//! through unchanged.

use crate::models::{
    CommandSource, ExecutionResult, InferenceResult, Language, PlanSafety, Response, ResponseFormat,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Instant;

/// Confidence reported for deterministic (non-inference) responses
pub const RESPONSE_CONFIDENCE: f32 = 0.9;

lazy_static! {
    static ref HINDI_PHRASES: Vec<(Regex, &'static str)> = [
        ("File created", "फ़ाइल बनाई गई"),
        ("File deleted", "फ़ाइल हटाई गई"),
        ("Application opened", "एप्लिकेशन खोला गया"),
        ("Application closed", "एप्लिकेशन बंद किया गया"),
        ("Operation completed", "ऑपरेशन पूर्ण हुआ"),
        ("Operation failed", "ऑपरेशन विफल रहा"),
    ]
    .into_iter()
    .map(|(en, hi)| {
        let pattern = Regex::new(&format!("(?i){}", regex::escape(en))).expect("invalid phrase pattern");
        (pattern, hi)
    })
    .collect();

    static ref NON_SPEAKABLE: Regex = Regex::new(r"[^\w\s\-.]").expect("invalid voice pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("invalid whitespace pattern");
}

/// What the pipeline ended with
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Denied { reason: &'a str },
    Blocked { safety: &'a PlanSafety },
    Executed { execution: &'a ExecutionResult },
    Chat { reply: &'a InferenceResult },
    Failed,
}

/// Detect language from script: Devanagari vs Latin letters
pub fn detect_language(text: &str) -> Language {
    let hindi = text.chars().filter(|c| ('\u{0900}'..='\u{097F}').contains(c)).count();
    let english = text.chars().filter(|c| c.is_ascii_alphabetic()).count();

    if hindi > 0 && english > 0 {
        Language::HiEn
    } else if hindi > english {
        Language::Hi
    } else {
        Language::En
    }
}

pub fn format_for_source(source: CommandSource) -> ResponseFormat {
    match source {
        CommandSource::Voice => ResponseFormat::Speech,
        CommandSource::Gui => ResponseFormat::Hybrid,
        CommandSource::Text | CommandSource::Api => ResponseFormat::Text,
    }
}

pub struct ResponseRenderer;

impl ResponseRenderer {
    pub fn render(
        command_id: &str,
        outcome: Outcome<'_>,
        language: Language,
        source: CommandSource,
        started: Instant,
    ) -> Response {
        let text = match language {
            Language::En => english(outcome),
            Language::Hi => hindi(outcome),
            Language::HiEn => format!("{} | {}", english(outcome), hindi(outcome)),
        };

        let confidence = match outcome {
            Outcome::Chat { reply } => reply.confidence,
            Outcome::Failed => 0.0,
            _ => RESPONSE_CONFIDENCE,
        };

        Response {
            command_id: command_id.to_string(),
            text,
            language,
            format: format_for_source(source),
            confidence,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Strip characters a speech engine would read out literally
    pub fn format_for_voice(response: &Response) -> String {
        let stripped = NON_SPEAKABLE.replace_all(&response.text, "");
        WHITESPACE.replace_all(&stripped, " ").trim().to_string()
    }

    pub fn format_for_display(response: &Response) -> String {
        format!(
            "{}\n[{}] - {}% confidence",
            response.text,
            response.language.to_string().to_uppercase(),
            (response.confidence * 100.0).round() as u32
        )
    }
}

/// Replace the first known English phrase with its Hindi equivalent
pub fn translate_to_hindi(text: &str) -> String {
    for (pattern, hindi) in HINDI_PHRASES.iter() {
        if pattern.is_match(text) {
            return pattern.replacen(text, 1, *hindi).into_owned();
        }
    }
    text.to_string()
}

fn first_error(execution: &ExecutionResult) -> &str {
    execution
        .results
        .iter()
        .find_map(|r| r.error.as_deref())
        .unwrap_or("unknown error")
}

fn english(outcome: Outcome<'_>) -> String {
    match outcome {
        Outcome::Denied { reason } => format!("Permission denied: {}", reason),
        Outcome::Blocked { safety } => format!(
            "Request blocked for safety: {} step(s) need review",
            safety.blocked_steps.len()
        ),
        Outcome::Executed { execution } if execution.success => {
            format!("Operation completed ({} steps)", execution.results.len())
        }
        Outcome::Executed { execution } => {
            format!("Operation failed: {}", first_error(execution))
        }
        Outcome::Chat { reply } if !reply.text.trim().is_empty() => reply.text.clone(),
        Outcome::Chat { .. } => {
            "The assistant is unavailable right now. Please try again later.".to_string()
        }
        Outcome::Failed => "Unable to process request".to_string(),
    }
}

fn hindi(outcome: Outcome<'_>) -> String {
    match outcome {
        Outcome::Denied { reason } => format!("अनुमति अस्वीकृत: {}", reason),
        Outcome::Blocked { safety } => format!(
            "सुरक्षा कारणों से अनुरोध रोका गया: {} चरण समीक्षा हेतु",
            safety.blocked_steps.len()
        ),
        Outcome::Executed { execution } if execution.success => {
            format!("ऑपरेशन पूर्ण हुआ ({} चरण)", execution.results.len())
        }
        Outcome::Executed { execution } => {
            format!("ऑपरेशन विफल रहा: {}", first_error(execution))
        }
        Outcome::Chat { reply } if !reply.text.trim().is_empty() => translate_to_hindi(&reply.text),
        Outcome::Chat { .. } => "सहायक अभी उपलब्ध नहीं है। कृपया बाद में पुनः प्रयास करें।".to_string(),
        Outcome::Failed => "अनुरोध को संसाधित नहीं कर सका".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StepResult, Vendor};

    fn execution(success: bool) -> ExecutionResult {
        let mut step = StepResult::failed("step_1", None, "agent not found");
        if success {
            step.success = true;
            step.error = None;
        }
        ExecutionResult {
            success,
            results: vec![step],
        }
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("open notepad"), Language::En);
        assert_eq!(detect_language("फ़ाइल खोलो"), Language::Hi);
        assert_eq!(detect_language("notepad खोलो"), Language::HiEn);
        assert_eq!(detect_language(""), Language::En);
    }

    #[test]
    fn test_denial_is_polite_text() {
        let response = ResponseRenderer::render(
            "cmd_1",
            Outcome::Denied { reason: "Role 'user' is not authorized for 'file:delete'" },
            Language::En,
            CommandSource::Text,
            Instant::now(),
        );

        assert!(response.text.starts_with("Permission denied"));
        assert_eq!(response.format, ResponseFormat::Text);
        assert_eq!(response.command_id, "cmd_1");
    }

    #[test]
    fn test_execution_texts_by_language() {
        let ok = execution(true);
        let failed = execution(false);

        let en = ResponseRenderer::render("c", Outcome::Executed { execution: &ok }, Language::En, CommandSource::Voice, Instant::now());
        assert_eq!(en.text, "Operation completed (1 steps)");
        assert_eq!(en.format, ResponseFormat::Speech);

        let hi = ResponseRenderer::render("c", Outcome::Executed { execution: &failed }, Language::Hi, CommandSource::Gui, Instant::now());
        assert_eq!(hi.text, "ऑपरेशन विफल रहा: agent not found");
        assert_eq!(hi.format, ResponseFormat::Hybrid);

        let both = ResponseRenderer::render("c", Outcome::Executed { execution: &ok }, Language::HiEn, CommandSource::Api, Instant::now());
        assert_eq!(both.text, "Operation completed (1 steps) | ऑपरेशन पूर्ण हुआ (1 चरण)");
    }

    #[test]
    fn test_unavailable_backend_renders_apology() {
        let reply = InferenceResult {
            text: String::new(),
            language: Language::En,
            confidence: 0.0,
            provider_used: Vendor::Ollama,
            latency_ms: 3000,
        };

        let response = ResponseRenderer::render("c", Outcome::Chat { reply: &reply }, Language::En, CommandSource::Text, Instant::now());
        assert!(response.text.contains("unavailable"));
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_translate_to_hindi() {
        assert_eq!(translate_to_hindi("file created successfully"), "फ़ाइल बनाई गई successfully");
        assert_eq!(translate_to_hindi("nothing to translate"), "nothing to translate");
    }

    #[test]
    fn test_voice_and_display_formatting() {
        let response = Response {
            command_id: "c".to_string(),
            text: "Done!  (2 steps) -- ok.".to_string(),
            language: Language::En,
            format: ResponseFormat::Speech,
            confidence: 0.9,
            latency_ms: 1,
        };

        assert_eq!(ResponseRenderer::format_for_voice(&response), "Done 2 steps -- ok.");
        assert_eq!(
            ResponseRenderer::format_for_display(&response),
            "Done!  (2 steps) -- ok.\n[EN] - 90% confidence"
        );
    }
}
