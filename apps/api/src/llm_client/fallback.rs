//! Schema-shaped placeholder replies used when the provider cannot be reached.
//!
//! Each payload is a JSON object with the analysis fields present and empty,
//! and a human-readable diagnostic in `summary`. `overall_score` is left out on
//! purpose so the reconciler derives it from the heuristic ATS score.

use serde_json::json;

use super::LlmError;
use crate::utils::truncate_chars;

pub const UNCONFIGURED_NOTICE: &str = "AI feedback unavailable: the LLM provider is not \
    configured on this server. Scores shown are heuristic only.";

/// Provider error bodies can be whole HTML pages.
const MAX_DIAGNOSTIC_CHARS: usize = 300;

pub fn unconfigured_payload() -> String {
    payload(UNCONFIGURED_NOTICE)
}

pub fn provider_failure_payload(err: &LlmError) -> String {
    let diagnostic = match err {
        LlmError::Api { status, message } => format!(
            "LLM request failed (status {status}): {}",
            truncate_chars(message.trim(), MAX_DIAGNOSTIC_CHARS)
        ),
        other => format!("LLM request failed: {other}"),
    };
    payload(&format!("AI feedback unavailable. {diagnostic}"))
}

fn payload(summary: &str) -> String {
    json!({
        "summary": summary,
        "strengths": [],
        "weaknesses": [],
        "missing_important_keywords": [],
        "suggestions": [],
        "best_fit_roles": [],
        "estimated_salary_range": ""
    })
    .to_string()
}
