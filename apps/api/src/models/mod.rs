use serde::{Deserialize, Serialize};

/// Deterministic statistics derived from resume text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub word_count: u32,
    pub has_contact: bool,
    pub sections_count: u32,
    pub skills_count: u32,
    pub action_verbs_count: u32,
}

/// Response of `POST /api/analyze`. Every list is present (possibly empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_important_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub best_fit_roles: Vec<String>,
    pub estimated_salary_range: String,
    pub ats_score: u8,
    pub features: FeatureSet,
}

/// Response of `POST /api/extract-skills`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillExtractionResult {
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tools: Vec<String>,
    pub certifications: Vec<String>,
    /// The unmodified model reply, for display when the lists come back empty.
    pub raw: String,
}

/// JD keywords partitioned by whether the resume mentions them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMatchResult {
    pub jd_keywords: Vec<String>,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub match_score: u8,
}

/// One row of `POST /api/multi-rank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResumeEntry {
    pub filename: String,
    pub ats_score: u8,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_set_serializes_camel_case() {
        let features = FeatureSet {
            word_count: 250,
            has_contact: true,
            sections_count: 4,
            skills_count: 6,
            action_verbs_count: 3,
        };
        assert_eq!(
            serde_json::to_value(features).unwrap(),
            json!({
                "wordCount": 250,
                "hasContact": true,
                "sectionsCount": 4,
                "skillsCount": 6,
                "actionVerbsCount": 3
            })
        );
    }

    #[test]
    fn test_ranked_entry_uses_client_field_names() {
        let entry = RankedResumeEntry {
            filename: "a.pdf".to_string(),
            ats_score: 72,
            summary: String::new(),
        };
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["atsScore"], 72);
        assert_eq!(value["filename"], "a.pdf");
    }

    #[test]
    fn test_keyword_match_uses_client_field_names() {
        let value = serde_json::to_value(KeywordMatchResult::default()).unwrap();
        assert!(value.get("jdKeywords").is_some());
        assert_eq!(value["matchScore"], 0);
    }
}
