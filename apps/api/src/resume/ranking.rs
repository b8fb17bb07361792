//! Multi-resume ranking: every upload becomes exactly one entry, failures included.

use crate::analysis::{compute_ats_score, extract_features};
use crate::extraction::StagedUpload;
use crate::llm_client::LlmGateway;
use crate::models::RankedResumeEntry;
use crate::reconcile::reconcile_text;
use crate::resume::prompts::rank_summary_prompt;

/// Scores and summarises each upload in order, then sorts by ATS score
/// (descending; ties keep upload order). Files are processed one at a time.
pub async fn rank_resumes(uploads: Vec<StagedUpload>, llm: &LlmGateway) -> Vec<RankedResumeEntry> {
    let mut entries = Vec::with_capacity(uploads.len());
    for upload in uploads {
        entries.push(rank_one(upload, llm).await);
    }
    sort_by_score(&mut entries);
    entries
}

/// Never fails: an unreadable file yields a zero-score entry explaining why.
async fn rank_one(upload: StagedUpload, llm: &LlmGateway) -> RankedResumeEntry {
    let filename = upload.filename().to_string();

    let text = match upload.extract_text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Ranking: skipping unreadable file '{filename}': {e}");
            return RankedResumeEntry {
                filename,
                ats_score: 0,
                summary: format!("Could not process file: {e}"),
            };
        }
    };

    let ats_score = compute_ats_score(&extract_features(&text));
    let prompt = rank_summary_prompt(&text);
    let reply = llm.complete(&prompt.text, prompt.max_tokens).await;

    RankedResumeEntry {
        filename,
        ats_score,
        summary: reconcile_text(&reply),
    }
}

/// `sort_by` is stable, which keeps equal scores in upload order.
fn sort_by_score(entries: &mut [RankedResumeEntry]) {
    entries.sort_by(|a, b| b.ats_score.cmp(&a.ats_score));
}
