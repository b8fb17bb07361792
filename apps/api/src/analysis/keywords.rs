use std::collections::HashMap;

use crate::models::KeywordMatchResult;

pub const JD_MATCH_TOP_N: usize = 20;

/// Tokens this short ("a", "to", "of") are never keywords.
const MIN_KEYWORD_LEN: usize = 3;

/// Lowercases and replaces every character outside `[a-z0-9]` and whitespace with a space.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Top `top_n` JD tokens by frequency; ties keep first-occurrence order.
pub fn top_keywords(jd_text: &str, top_n: usize) -> Vec<String> {
    let normalized = normalize(jd_text);

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for token in normalized.split_whitespace() {
        if token.chars().count() < MIN_KEYWORD_LEN {
            continue;
        }
        match index.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(top_n)
        .map(|(token, _)| token.to_string())
        .collect()
}

/// Partitions the JD's top keywords by whether the resume contains them.
///
/// Containment is a plain substring test on the normalized resume, so "sql" is
/// present in a resume that only says "PostgreSQL". An empty keyword list scores 0.
pub fn match_keywords(resume_text: &str, jd_text: &str, top_n: usize) -> KeywordMatchResult {
    let jd_keywords = top_keywords(jd_text, top_n);
    let resume = normalize(resume_text);

    let (present, missing): (Vec<String>, Vec<String>) = jd_keywords
        .iter()
        .cloned()
        .partition(|keyword| resume.contains(keyword.as_str()));

    let match_score = percentage(present.len(), jd_keywords.len());

    KeywordMatchResult {
        jd_keywords,
        present,
        missing,
        match_score,
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)).min(100) as u8
}
