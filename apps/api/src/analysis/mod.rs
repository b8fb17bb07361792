//! Deterministic resume heuristics: feature extraction, ATS scoring and JD keyword matching.
//! Nothing in here calls the LLM; every function is pure.

pub mod features;
pub mod keywords;
pub mod scoring;

pub use features::extract_features;
pub use keywords::{match_keywords, JD_MATCH_TOP_N};
pub use scoring::compute_ats_score;
