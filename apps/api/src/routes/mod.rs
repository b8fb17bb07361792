pub mod health;
pub mod limits;

use axum::{middleware, routing::get, routing::post, Router};

use crate::resume::handlers;
use crate::state::AppState;

use self::limits::{limit_request_body, BodyLimits};

pub fn build_router(state: AppState) -> Router {
    let limits = BodyLimits::from_config(&state.config);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/analyze", post(handlers::handle_analyze))
        .route("/api/jd-match", post(handlers::handle_jd_match))
        .route("/api/rewriter", post(handlers::handle_rewrite))
        .route("/api/extract-skills", post(handlers::handle_extract_skills))
        .route("/api/cover-letter", post(handlers::handle_cover_letter))
        .route("/api/multi-rank", post(handlers::handle_multi_rank))
        .layer(middleware::from_fn_with_state(limits, limit_request_body))
        .with_state(state)
}
