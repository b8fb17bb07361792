use tracing::warn;

use super::{parse_reply, score_field, string_field, string_list, ParsedReply};
use crate::models::{AnalysisResult, FeatureSet};
use crate::utils::truncate_chars;

/// Every list in the analysis is capped at this many items.
pub const MAX_LIST_ITEMS: usize = 8;
/// How much of an unparseable reply is kept as the summary.
pub const RAW_SUMMARY_CHARS: usize = 800;

/// Used when the model gives no usable `overall_score`: halfway between the
/// heuristic score and 70, rounded half up.
pub fn default_overall_score(ats_score: u8) -> u8 {
    ((u16::from(ats_score) + 70 + 1) / 2) as u8
}

/// Builds the complete analysis response from a raw model reply.
/// `ats_score` and `features` always come from the heuristics, never from the model.
pub fn reconcile_analysis(raw: &str, ats_score: u8, features: FeatureSet) -> AnalysisResult {
    let parsed = parse_reply(raw);
    if let ParsedReply::Invalid { reason } = &parsed {
        warn!("Analysis reply not usable as JSON ({reason}); applying defaults");
    }
    let fields = parsed.fields();

    let summary = match fields {
        Some(f) => string_field(f, "summary").unwrap_or_default(),
        None => truncate_chars(raw.trim(), RAW_SUMMARY_CHARS).to_string(),
    };

    AnalysisResult {
        overall_score: score_field(fields, "overall_score")
            .unwrap_or_else(|| default_overall_score(ats_score)),
        summary,
        strengths: string_list(fields, "strengths", MAX_LIST_ITEMS),
        weaknesses: string_list(fields, "weaknesses", MAX_LIST_ITEMS),
        missing_important_keywords: string_list(
            fields,
            "missing_important_keywords",
            MAX_LIST_ITEMS,
        ),
        suggestions: string_list(fields, "suggestions", MAX_LIST_ITEMS),
        best_fit_roles: string_list(fields, "best_fit_roles", MAX_LIST_ITEMS),
        estimated_salary_range: fields
            .and_then(|f| string_field(f, "estimated_salary_range"))
            .unwrap_or_default(),
        ats_score,
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const REQUIRED_FIELDS: &[&str] = &[
        "overall_score",
        "summary",
        "strengths",
        "weaknesses",
        "missing_important_keywords",
        "suggestions",
        "best_fit_roles",
        "estimated_salary_range",
        "ats_score",
        "features",
    ];

    fn assert_schema_complete(result: &AnalysisResult) {
        let value = serde_json::to_value(result).unwrap();
        for field in REQUIRED_FIELDS {
            let v = value.get(*field).unwrap_or_else(|| panic!("missing {field}"));
            assert!(!v.is_null(), "{field} is null");
        }
        for field in ["overall_score", "ats_score"] {
            assert!(value[field].is_u64(), "{field} not a number");
        }
        for field in [
            "strengths",
            "weaknesses",
            "missing_important_keywords",
            "suggestions",
            "best_fit_roles",
        ] {
            assert!(value[field].is_array(), "{field} not an array");
        }
        assert!(matches!(value["summary"], Value::String(_)));
    }

    #[test]
    fn test_default_overall_score_rounds_half_up() {
        assert_eq!(default_overall_score(79), 75);
        assert_eq!(default_overall_score(80), 75);
        assert_eq!(default_overall_score(0), 35);
        assert_eq!(default_overall_score(100), 85);
    }

    #[test]
    fn test_well_formed_reply() {
        let raw = r#"Here is the analysis:
        {"overall_score": 81, "summary": "Solid backend profile.",
         "strengths": ["Rust", "Distributed systems"], "weaknesses": ["No metrics"],
         "missing_important_keywords": ["Kubernetes"], "suggestions": ["Quantify impact"],
         "best_fit_roles": ["Backend Engineer"], "estimated_salary_range": "$120k-$150k"}"#;
        let result = reconcile_analysis(raw, 60, FeatureSet::default());
        assert_eq!(result.overall_score, 81);
        assert_eq!(result.summary, "Solid backend profile.");
        assert_eq!(result.strengths, vec!["Rust", "Distributed systems"]);
        assert_eq!(result.estimated_salary_range, "$120k-$150k");
        assert_eq!(result.ats_score, 60);
    }

    #[test]
    fn test_garbage_reply_keeps_truncated_raw_summary() {
        let raw = format!("The model rambled: {}", "blah ".repeat(400));
        let result = reconcile_analysis(&raw, 79, FeatureSet::default());
        assert_eq!(result.overall_score, 75);
        assert_eq!(result.summary.chars().count(), RAW_SUMMARY_CHARS);
        assert!(result.strengths.is_empty());
        assert_schema_complete(&result);
    }

    #[test]
    fn test_mistyped_fields_are_coerced() {
        let raw = r#"{"overall_score": "ninety", "summary": ["not", "a", "string"],
            "strengths": "should be a list", "weaknesses": null,
            "suggestions": ["1","2","3","4","5","6","7","8","9","10"],
            "estimated_salary_range": 95000}"#;
        let result = reconcile_analysis(raw, 50, FeatureSet::default());
        assert_eq!(result.overall_score, 60);
        assert_eq!(result.summary, "");
        assert!(result.strengths.is_empty());
        assert!(result.weaknesses.is_empty());
        assert_eq!(result.suggestions.len(), MAX_LIST_ITEMS);
        assert_eq!(result.estimated_salary_range, "95000");
        assert_schema_complete(&result);
    }

    #[test]
    fn test_any_input_yields_complete_schema() {
        let inputs = [
            "",
            "   ",
            "{",
            "}",
            "{\"overall_score\": 70, \"summary\": \"cut off",
            "[1, 2, 3]",
            "{\"strengths\": [{\"nested\": true}]}",
            "null",
            "🙂 {} 🙂",
        ];
        for raw in inputs {
            let result = reconcile_analysis(raw, 42, FeatureSet::default());
            assert_schema_complete(&result);
        }
    }

    #[test]
    fn test_heuristic_fields_are_not_taken_from_model() {
        let raw = r#"{"ats_score": 3, "features": {"wordCount": 1}}"#;
        let features = FeatureSet {
            word_count: 300,
            ..FeatureSet::default()
        };
        let result = reconcile_analysis(raw, 66, features);
        assert_eq!(result.ats_score, 66);
        assert_eq!(result.features.word_count, 300);
    }
}
