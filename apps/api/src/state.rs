use crate::config::Config;
use crate::llm_client::LlmGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data: every request is computed from scratch.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmGateway,
    pub config: Config,
}
