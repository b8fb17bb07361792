use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::extraction::ExtractionError;

/// Set once at startup; production hides internal error details from clients.
static VERBOSE_ERRORS: AtomicBool = AtomicBool::new(true);

pub fn set_verbose_errors(verbose: bool) {
    VERBOSE_ERRORS.store(verbose, Ordering::Relaxed);
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// LLM provider failures are intentionally absent: the gateway absorbs them into
/// fallback replies, so they never reach the client as transport-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Maps an axum extractor rejection by its status: 413 stays 413, anything
    /// else is a client-input error.
    pub fn from_rejection(status: StatusCode, body_text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(body_text)
        } else {
            AppError::Validation(body_text)
        }
    }

    /// Renders the `{error, details?}` body. `verbose` controls whether internal
    /// diagnostics are exposed.
    pub fn to_body(&self, verbose: bool) -> (StatusCode, Value) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({
                    "error": "Request body too large",
                    "details": msg
                }),
            ),
            AppError::Extraction(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Could not read uploaded file",
                    "details": e.to_string()
                }),
            ),
            AppError::Internal(e) => {
                if verbose {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({
                            "error": "An internal server error occurred",
                            "details": format!("{e:#}")
                        }),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "An internal server error occurred" }),
                    )
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => tracing::debug!("Rejected request: {msg}"),
            AppError::PayloadTooLarge(msg) => tracing::warn!("Rejected oversized request: {msg}"),
            AppError::Extraction(e) => tracing::warn!("Extraction failed: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        let (status, body) = self.to_body(VERBOSE_ERRORS.load(Ordering::Relaxed));
        (status, Json(body)).into_response()
    }
}
