//! Response Reconciler: turns untrusted model output into complete, typed records.
//!
//! Two separate steps:
//! 1. [`parse_reply`] locates and parses the JSON object inside the reply
//!    (`Valid` / `Invalid { reason }`);
//! 2. per-schema defaulting (`analysis`, `skills`) reads fields leniently and
//!    fills anything missing or mistyped, so callers never see an absent field.

use serde_json::{Map, Value};

use crate::llm_client::LlmReply;

pub mod analysis;
pub mod skills;

pub use analysis::reconcile_analysis;
pub use skills::reconcile_skills;

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    Valid(Fields),
    Invalid { reason: String },
}

impl ParsedReply {
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            ParsedReply::Valid(fields) => Some(fields),
            ParsedReply::Invalid { .. } => None,
        }
    }
}

/// The substring from the first `{` to the last `}`, inclusive.
/// Tolerates prose or code fences around the object.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(span) = extract_json_span(raw) else {
        return ParsedReply::Invalid {
            reason: "no JSON object found in reply".to_string(),
        };
    };

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(fields)) => ParsedReply::Valid(fields),
        Ok(_) => ParsedReply::Invalid {
            reason: "reply JSON is not an object".to_string(),
        },
        Err(e) => ParsedReply::Invalid {
            reason: format!("reply JSON did not parse: {e}"),
        },
    }
}

/// Text for capabilities whose output is prose (rewrite, cover letter, match
/// explanation, ranking summary). A fallback reply is reduced to its diagnostic.
pub fn reconcile_text(reply: &LlmReply) -> String {
    match reply {
        LlmReply::Success { text } => text.trim().to_string(),
        LlmReply::Fallback { text } => parse_reply(text)
            .fields()
            .and_then(|fields| string_field(fields, "summary"))
            .unwrap_or_else(|| text.clone()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field readers shared by the per-schema reconcilers
// ────────────────────────────────────────────────────────────────────────────

/// String items of an array field, capped at `limit`. Numbers and booleans are
/// stringified; blanks, nulls and nested values are dropped. Any non-array → empty.
pub(crate) fn string_list(fields: Option<&Fields>, key: &str, limit: usize) -> Vec<String> {
    let Some(Value::Array(items)) = fields.and_then(|f| f.get(key)) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect()
}

/// A 0–100 score from a number or numeric string; fractional values are rounded.
pub(crate) fn score_field(fields: Option<&Fields>, key: &str) -> Option<u8> {
    let number = match fields?.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

pub(crate) fn string_field(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
