use tracing::warn;

use super::{parse_reply, string_list, ParsedReply};
use crate::models::SkillExtractionResult;

pub const MAX_SKILLS_PER_GROUP: usize = 30;

pub fn reconcile_skills(raw: &str) -> SkillExtractionResult {
    let parsed = parse_reply(raw);
    if let ParsedReply::Invalid { reason } = &parsed {
        warn!("Skills reply not usable as JSON ({reason}); returning empty groups");
    }
    let fields = parsed.fields();

    SkillExtractionResult {
        hard_skills: string_list(fields, "hard_skills", MAX_SKILLS_PER_GROUP),
        soft_skills: string_list(fields, "soft_skills", MAX_SKILLS_PER_GROUP),
        tools: string_list(fields, "tools", MAX_SKILLS_PER_GROUP),
        certifications: string_list(fields, "certifications", MAX_SKILLS_PER_GROUP),
        raw: raw.to_string(),
    }
}
