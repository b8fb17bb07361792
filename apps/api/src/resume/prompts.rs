// Prompt templates for every resume capability.
// Placeholders are `{name}`; any other brace is literal text.

use crate::utils::truncate_chars;

/// Only the head of a resume/JD is sent where the prompt just needs the gist.
pub const EXCERPT_CHARS: usize = 2000;

pub const ANALYZE_MAX_TOKENS: u32 = 800;
pub const JD_MATCH_MAX_TOKENS: u32 = 500;
pub const REWRITE_MAX_TOKENS: u32 = 1200;
pub const SKILLS_MAX_TOKENS: u32 = 500;
pub const COVER_LETTER_MAX_TOKENS: u32 = 600;
pub const RANK_SUMMARY_MAX_TOKENS: u32 = 200;

pub const DEFAULT_ROLE: &str = "Software Engineer";

/// A rendered prompt plus the completion budget for its use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub max_tokens: u32,
}

pub const ANALYZE_TEMPLATE: &str = r#"You are a resume expert. Analyze this resume for {role} roles.
Return JSON EXACTLY in this shape:
{
  "overall_score": number 0-100,
  "summary": "string",
  "strengths": [],
  "weaknesses": [],
  "missing_important_keywords": [],
  "suggestions": [],
  "best_fit_roles": [],
  "estimated_salary_range": "string"
}
Limit arrays to 8 items each.

Resume:
{resume_text}"#;

pub const JD_MATCH_TEMPLATE: &str = r#"Explain how well this resume matches the job description, then suggest 6 concrete improvements to the resume.
Answer in plain prose with a numbered list of improvements.

Resume (excerpt):
{resume_text}

Job description (excerpt):
{jd_text}"#;

pub const REWRITE_TEMPLATE: &str = r#"Rewrite the following resume so it passes ATS screening for the role: {role}.
Keep the bullet structure, start bullets with strong action verbs and quantify results wherever the original supports it. Do not invent experience.
Return only the rewritten resume text.

Resume:
{resume_text}"#;

pub const SKILLS_TEMPLATE: &str = r#"Extract skills from the resume below as JSON EXACTLY in this shape:
{ "hard_skills": [], "soft_skills": [], "tools": [], "certifications": [] }
Limit 30 items per list.

Resume:
{resume_text}"#;

pub const COVER_LETTER_TEMPLATE: &str = r#"Generate a professional one-page cover letter for this job using only facts from the resume.
Return only the letter text.

Resume:
{resume_text}

Job description:
{jd_text}"#;

pub const RANK_SUMMARY_TEMPLATE: &str = r#"Summarize this resume in two or three sentences and suggest the best-fit role.

Resume (excerpt):
{resume_text}"#;

pub fn analyze_prompt(resume_text: &str, role: &str) -> Prompt {
    Prompt {
        text: render(
            ANALYZE_TEMPLATE,
            &[("role", role), ("resume_text", resume_text)],
        ),
        max_tokens: ANALYZE_MAX_TOKENS,
    }
}

pub fn jd_match_prompt(resume_text: &str, jd_text: &str) -> Prompt {
    Prompt {
        text: render(
            JD_MATCH_TEMPLATE,
            &[
                ("resume_text", truncate_chars(resume_text, EXCERPT_CHARS)),
                ("jd_text", truncate_chars(jd_text, EXCERPT_CHARS)),
            ],
        ),
        max_tokens: JD_MATCH_MAX_TOKENS,
    }
}

pub fn rewrite_prompt(resume_text: &str, role: &str) -> Prompt {
    Prompt {
        text: render(
            REWRITE_TEMPLATE,
            &[("role", role), ("resume_text", resume_text)],
        ),
        max_tokens: REWRITE_MAX_TOKENS,
    }
}

pub fn skills_prompt(resume_text: &str) -> Prompt {
    Prompt {
        text: render(SKILLS_TEMPLATE, &[("resume_text", resume_text)]),
        max_tokens: SKILLS_MAX_TOKENS,
    }
}

pub fn cover_letter_prompt(resume_text: &str, jd_text: &str) -> Prompt {
    Prompt {
        text: render(
            COVER_LETTER_TEMPLATE,
            &[("resume_text", resume_text), ("jd_text", jd_text)],
        ),
        max_tokens: COVER_LETTER_MAX_TOKENS,
    }
}

pub fn rank_summary_prompt(resume_text: &str) -> Prompt {
    Prompt {
        text: render(
            RANK_SUMMARY_TEMPLATE,
            &[("resume_text", truncate_chars(resume_text, EXCERPT_CHARS))],
        ),
        max_tokens: RANK_SUMMARY_MAX_TOKENS,
    }
}

/// Single-pass substitution, so user text containing `{jd_text}` is never re-expanded.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let after_brace = &rest[pos + 1..];

        let matched = vars.iter().find_map(|(name, value)| {
            after_brace
                .strip_prefix(name)
                .and_then(|r| r.strip_prefix('}'))
                .map(|remaining| (*value, remaining))
        });

        match matched {
            Some((value, remaining)) => {
                out.push_str(value);
                rest = remaining;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }

    out.push_str(rest);
    out
}
