use crate::models::FeatureSet;

const BASE_SCORE: i64 = 40;

/// Maps a feature record to the 0–100 heuristic ATS score.
///
/// ```text
/// 40 + min(20, words/100) + (contact ? 10 : -10) + min(15, sections*3)
///    + min(15, skills*2) + min(10, verbs), clamped to [0, 100]
/// ```
pub fn compute_ats_score(features: &FeatureSet) -> u8 {
    let words = i64::from(features.word_count);
    let sections = i64::from(features.sections_count);
    let skills = i64::from(features.skills_count);
    let verbs = i64::from(features.action_verbs_count);

    let score = BASE_SCORE
        + (words / 100).min(20)
        + if features.has_contact { 10 } else { -10 }
        + (sections * 3).min(15)
        + (skills * 2).min(15)
        + verbs.min(10);

    score.clamp(0, 100) as u8
}
