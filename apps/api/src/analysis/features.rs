use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::FeatureSet;

/// Any of these (case-insensitive) counts as contact information.
const CONTACT_MARKERS: &[&str] = &["@", "gmail", "phone", "tel", "linkedin", "http"];

static SECTION_RE: OnceLock<Regex> = OnceLock::new();
static SKILL_RE: OnceLock<Regex> = OnceLock::new();
static ACTION_VERB_RE: OnceLock<Regex> = OnceLock::new();

fn section_re() -> &'static Regex {
    SECTION_RE.get_or_init(|| {
        Regex::new(r"(?i)(experience|education|skills|projects|certifications|summary)")
            .expect("section pattern is valid")
    })
}

// Alternation order matters: "javascript" is counted as "java" (leftmost-first).
fn skill_re() -> &'static Regex {
    SKILL_RE.get_or_init(|| {
        Regex::new(
            r"(?i)(python|java|c\+\+|c#|javascript|react|node|sql|aws|docker|kubernetes|tensorflow|pytorch|git)",
        )
        .expect("skill pattern is valid")
    })
}

fn action_verb_re() -> &'static Regex {
    ACTION_VERB_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(led|developed|designed|implemented|optimized|built|created|improved)\b")
            .expect("action verb pattern is valid")
    })
}

/// Derives the fixed feature record from resume text.
///
/// Sections and skills are deduplicated case-insensitively; action verbs are not,
/// so "Built ... built ..." counts twice. Substring matching is deliberate for
/// sections and skills ("postgresql" contributes "sql").
pub fn extract_features(text: &str) -> FeatureSet {
    let lower = text.to_lowercase();

    FeatureSet {
        word_count: saturating_u32(text.split_whitespace().count()),
        has_contact: CONTACT_MARKERS.iter().any(|m| lower.contains(m)),
        sections_count: distinct_matches(section_re(), text),
        skills_count: distinct_matches(skill_re(), text),
        action_verbs_count: saturating_u32(action_verb_re().find_iter(text).count()),
    }
}

fn distinct_matches(re: &Regex, text: &str) -> u32 {
    let distinct: HashSet<String> = re
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    saturating_u32(distinct.len())
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESUME: &str = "Jane Doe | jane@example.com | linkedin.com/in/jane
SUMMARY
Backend engineer.
EXPERIENCE
Led a team of four. Developed Python and Docker services on AWS. Built CI with Git.
EDUCATION
B.Sc. Computer Science
SKILLS
Python, PostgreSQL, Kubernetes";

    #[test]
    fn test_empty_text_yields_zero_features() {
        assert_eq!(extract_features(""), FeatureSet::default());
        assert_eq!(extract_features("   \n\t "), FeatureSet::default());
    }

    #[test]
    fn test_word_count_counts_whitespace_runs() {
        assert_eq!(extract_features("one  two\n\nthree\tfour").word_count, 4);
    }

    #[test]
    fn test_contact_markers_case_insensitive() {
        assert!(extract_features("Phone: 555-1234").has_contact);
        assert!(extract_features("see HTTPS://me.dev").has_contact);
        assert!(!extract_features("no way to reach me").has_contact);
    }

    #[test]
    fn test_sections_are_deduplicated() {
        let features = extract_features("Experience ... EXPERIENCE ... education");
        assert_eq!(features.sections_count, 2);
    }

    #[test]
    fn test_sample_resume_features() {
        let features = extract_features(SAMPLE_RESUME);
        assert!(features.has_contact);
        assert_eq!(features.sections_count, 4);
        // python, docker, aws, git, sql (inside postgresql), kubernetes
        assert_eq!(features.skills_count, 6);
        // led, developed, built
        assert_eq!(features.action_verbs_count, 3);
    }

    #[test]
    fn test_javascript_counts_as_java() {
        let features = extract_features("JavaScript and Java");
        assert_eq!(features.skills_count, 1);
    }

    #[test]
    fn test_action_verbs_require_word_boundaries_and_repeat() {
        let features = extract_features("Built things. built more. Skilled, rebuilt, misled.");
        assert_eq!(features.action_verbs_count, 2);
    }
}
