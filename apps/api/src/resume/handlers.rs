//! Axum route handlers for the resume API.
//!
//! Every handler validates its required inputs before any extraction or LLM
//! call, so a bad request never costs a model round-trip.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{compute_ats_score, extract_features, match_keywords, JD_MATCH_TOP_N};
use crate::errors::AppError;
use crate::models::{
    AnalysisResult, KeywordMatchResult, RankedResumeEntry, SkillExtractionResult,
};
use crate::reconcile::{reconcile_analysis, reconcile_skills, reconcile_text};
use crate::resume::input::{non_blank, ResumeForm};
use crate::resume::prompts;
use crate::resume::ranking::rank_resumes;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JdMatchResponse {
    #[serde(flatten)]
    pub keywords: KeywordMatchResult,
    pub llm: String,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub rewritten: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub jd: Option<String>,
    pub resume: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub letter: String,
}

#[derive(Debug, Serialize)]
pub struct MultiRankResponse {
    pub results: Vec<RankedResumeEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze
///
/// Heuristic ATS score plus LLM feedback, reconciled into a complete AnalysisResult.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut form: ResumeForm,
) -> Result<Json<AnalysisResult>, AppError> {
    let resume_text = form
        .take_resume_text()
        .await?
        .ok_or_else(|| AppError::Validation("Resume text required".to_string()))?;

    let features = extract_features(&resume_text);
    let ats_score = compute_ats_score(&features);

    let prompt = prompts::analyze_prompt(&resume_text, form.role_or_default());
    let reply = state.llm.complete(&prompt.text, prompt.max_tokens).await;
    if reply.is_fallback() {
        tracing::info!("Analysis served with heuristic score only (ats_score={ats_score})");
    }

    Ok(Json(reconcile_analysis(reply.text(), ats_score, features)))
}

/// POST /api/jd-match
pub async fn handle_jd_match(
    State(state): State<AppState>,
    mut form: ResumeForm,
) -> Result<Json<JdMatchResponse>, AppError> {
    let jd_text = form
        .jd
        .take()
        .ok_or_else(|| AppError::Validation("JD required".to_string()))?;
    let resume_text = form
        .take_resume_text()
        .await?
        .ok_or_else(|| AppError::Validation("Resume required".to_string()))?;

    let keywords = match_keywords(&resume_text, &jd_text, JD_MATCH_TOP_N);

    let prompt = prompts::jd_match_prompt(&resume_text, &jd_text);
    let reply = state.llm.complete(&prompt.text, prompt.max_tokens).await;

    Ok(Json(JdMatchResponse {
        keywords,
        llm: reconcile_text(&reply),
    }))
}

/// POST /api/rewriter
pub async fn handle_rewrite(
    State(state): State<AppState>,
    mut form: ResumeForm,
) -> Result<Json<RewriteResponse>, AppError> {
    let resume_text = form
        .take_resume_text()
        .await?
        .ok_or_else(|| AppError::Validation("Resume required".to_string()))?;

    let prompt = prompts::rewrite_prompt(&resume_text, form.role_or_default());
    let reply = state.llm.complete(&prompt.text, prompt.max_tokens).await;

    Ok(Json(RewriteResponse {
        rewritten: reconcile_text(&reply),
    }))
}

/// POST /api/extract-skills
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    mut form: ResumeForm,
) -> Result<Json<SkillExtractionResult>, AppError> {
    let resume_text = form
        .take_resume_text()
        .await?
        .ok_or_else(|| AppError::Validation("Resume required".to_string()))?;

    let prompt = prompts::skills_prompt(&resume_text);
    let reply = state.llm.complete(&prompt.text, prompt.max_tokens).await;

    Ok(Json(reconcile_skills(reply.text())))
}

/// POST /api/cover-letter
///
/// JSON only: `{ "jd": "...", "resume": "..." }`, both required.
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    request: Result<Json<CoverLetterRequest>, JsonRejection>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let Json(request) =
        request.map_err(|e| AppError::from_rejection(e.status(), e.body_text()))?;

    let (jd_text, resume_text) = match (non_blank(request.jd), non_blank(request.resume)) {
        (Some(jd), Some(resume)) => (jd, resume),
        _ => return Err(AppError::Validation("JD and resume required".to_string())),
    };

    let prompt = prompts::cover_letter_prompt(&resume_text, &jd_text);
    let reply = state.llm.complete(&prompt.text, prompt.max_tokens).await;

    Ok(Json(CoverLetterResponse {
        letter: reconcile_text(&reply),
    }))
}

/// POST /api/multi-rank
///
/// Per-file failures become zero-score entries; only an empty upload list is an error.
pub async fn handle_multi_rank(
    State(state): State<AppState>,
    form: ResumeForm,
) -> Result<Json<MultiRankResponse>, AppError> {
    if form.files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }

    tracing::info!("Ranking {} resumes", form.files.len());
    let results = rank_resumes(form.files, &state.llm).await;

    Ok(Json(MultiRankResponse { results }))
}
