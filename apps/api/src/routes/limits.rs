//! Request body limits chosen per content type.
//!
//! JSON and urlencoded bodies are buffered in memory and get `max_body_bytes`.
//! Multipart bodies are streamed to disk one file at a time, so they get room
//! for a full batch of `max_upload_file_bytes` files.

use std::convert::Infallible;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    middleware::Next,
    response::Response,
};
use tower::{Layer, ServiceExt};

use crate::config::Config;
use crate::resume::input::MAX_UPLOAD_FILES;

/// Inserted into every request so extractors can enforce the per-file cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    pub body_bytes: usize,
    pub file_bytes: usize,
}

impl BodyLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            body_bytes: config.max_body_bytes,
            file_bytes: config.max_upload_file_bytes,
        }
    }

    /// A full batch of maximum-size files plus one body's worth for text fields and framing.
    pub fn multipart_bytes(&self) -> usize {
        self.file_bytes
            .saturating_mul(MAX_UPLOAD_FILES)
            .saturating_add(self.body_bytes)
    }

    pub fn for_headers(&self, headers: &HeaderMap) -> usize {
        if is_multipart(headers) {
            self.multipart_bytes()
        } else {
            self.body_bytes
        }
    }
}

pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

pub async fn limit_request_body(
    State(limits): State<BodyLimits>,
    mut req: Request,
    next: Next,
) -> Response {
    let limit = limits.for_headers(req.headers());
    req.extensions_mut().insert(limits);

    let outcome: Result<Response, Infallible> =
        DefaultBodyLimit::max(limit).layer(next).oneshot(req).await;
    match outcome {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_multipart_gets_batch_allowance() {
        let limits = BodyLimits {
            body_bytes: 1_000,
            file_bytes: 2_000,
        };
        assert_eq!(limits.multipart_bytes(), 2_000 * MAX_UPLOAD_FILES + 1_000);
        assert_eq!(
            limits.for_headers(&headers("multipart/form-data; boundary=x")),
            limits.multipart_bytes()
        );
        assert_eq!(limits.for_headers(&headers("application/json")), 1_000);
        assert_eq!(limits.for_headers(&HeaderMap::new()), 1_000);
    }

    #[test]
    fn test_multipart_detection_ignores_case() {
        assert!(is_multipart(&headers("Multipart/Form-Data; boundary=x")));
        assert!(!is_multipart(&headers("application/x-www-form-urlencoded")));
    }

    #[test]
    fn test_limits_follow_config() {
        let limits = BodyLimits::from_config(&Config::default());
        assert_eq!(limits.body_bytes, 10 * 1024 * 1024);
        assert_eq!(limits.file_bytes, 10 * 1024 * 1024);
    }
}
