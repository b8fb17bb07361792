//! Request bodies for the text-bearing endpoints.
//!
//! The browser client sends `multipart/form-data` (files) or JSON (pasted text);
//! both land in the same [`ResumeForm`]. Uploaded files are spooled to disk as
//! they stream in, see [`StagedUpload`].

use axum::{
    async_trait,
    extract::{
        multipart::{Field, MultipartError},
        FromRequest, Multipart, Request,
    },
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extraction::{ExtractionError, StagedUpload};
use crate::routes::limits::{is_multipart, BodyLimits};

pub const MAX_UPLOAD_FILES: usize = 50;

#[derive(Debug, Default)]
pub struct ResumeForm {
    pub text: Option<String>,
    pub jd: Option<String>,
    pub role: Option<String>,
    /// Every part that carried a filename, in request order.
    pub files: Vec<StagedUpload>,
}

#[derive(Debug, Default, Deserialize)]
struct ResumeFields {
    text: Option<String>,
    jd: Option<String>,
    role: Option<String>,
    /// Some clients send pasted resume text as `resume`.
    resume: Option<String>,
}

impl From<ResumeFields> for ResumeForm {
    fn from(fields: ResumeFields) -> Self {
        Self {
            text: non_blank(fields.text).or_else(|| non_blank(fields.resume)),
            jd: non_blank(fields.jd),
            role: non_blank(fields.role),
            files: Vec::new(),
        }
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ResumeForm {
    /// Pasted text wins over an upload; only the first upload is read.
    /// `Ok(None)` means the request carried no resume at all.
    pub async fn take_resume_text(&mut self) -> Result<Option<String>, ExtractionError> {
        if let Some(text) = self.text.take() {
            return Ok(Some(text));
        }
        if self.files.is_empty() {
            return Ok(None);
        }
        // Remaining uploads are dropped (and deleted) with the form.
        let upload = self.files.remove(0);
        upload.extract_text().await.map(Some)
    }

    /// The requested role, or the default when none was given.
    pub fn role_or_default(&self) -> &str {
        self.role
            .as_deref()
            .map(str::trim)
            .unwrap_or(super::prompts::DEFAULT_ROLE)
    }

    /// `file_limit` caps each upload; `None` leaves only the body limit in force.
    async fn from_multipart(
        mut multipart: Multipart,
        file_limit: Option<usize>,
    ) -> Result<Self, AppError> {
        let mut fields = ResumeFields::default();
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(filename) = field.file_name().map(str::to_string) {
                if files.len() == MAX_UPLOAD_FILES {
                    return Err(AppError::Validation(format!(
                        "Too many files: at most {MAX_UPLOAD_FILES} uploads per request"
                    )));
                }
                files.push(stage_field(field, filename, file_limit).await?);
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            match name.as_str() {
                "text" => fields.text = Some(value),
                "jd" => fields.jd = Some(value),
                "role" => fields.role = Some(value),
                "resume" => fields.resume = Some(value),
                other => tracing::debug!("Ignoring unknown form field '{other}'"),
            }
        }

        let mut form = ResumeForm::from(fields);
        form.files = files;
        Ok(form)
    }
}

async fn stage_field(
    mut field: Field<'_>,
    filename: String,
    file_limit: Option<usize>,
) -> Result<StagedUpload, AppError> {
    let content_type = field.content_type().map(str::to_string);
    let mut upload = StagedUpload::create(filename, content_type)?;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if let Some(limit) = file_limit {
            if upload.bytes_staged() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "File '{}' exceeds the {limit} byte upload limit",
                    upload.filename()
                )));
            }
        }
        upload.append(&chunk).await?;
    }

    tracing::debug!(
        "Staged upload '{}' ({} bytes)",
        upload.filename(),
        upload.bytes_staged()
    );
    Ok(upload)
}

fn multipart_error(e: MultipartError) -> AppError {
    match AppError::from_rejection(e.status(), e.body_text()) {
        AppError::Validation(msg) => AppError::Validation(format!("Invalid multipart body: {msg}")),
        other => other,
    }
}

#[async_trait]
impl<S> FromRequest<S> for ResumeForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if is_multipart(req.headers()) {
            let file_limit = req
                .extensions()
                .get::<BodyLimits>()
                .map(|limits| limits.file_bytes);
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::from_rejection(e.status(), e.body_text()))?;
            Self::from_multipart(multipart, file_limit).await
        } else if content_type.starts_with("application/json") {
            let Json(fields) = Json::<ResumeFields>::from_request(req, state)
                .await
                .map_err(|e| AppError::from_rejection(e.status(), e.body_text()))?;
            Ok(fields.into())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<ResumeFields>::from_request(req, state)
                .await
                .map_err(|e| AppError::from_rejection(e.status(), e.body_text()))?;
            Ok(fields.into())
        } else {
            // No usable body: handlers report the missing input.
            Ok(Self::default())
        }
    }
}
