use crate::core::{split_uploads, ReviewEngine};
use crate::domain::model::{CrmOutcome, ReviewReport};
use crate::domain::ports::{LlmClient, Storage, TextExtractor};
use crate::server::render;
use crate::utils::error::{ErrorCategory, Result, ValidatorError};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower_http::trace::TraceLayer;

/// HTTP status for a failed validation.
pub fn status_for(err: &ValidatorError) -> StatusCode {
    if let ValidatorError::UploadTooLarge { .. } = err {
        return StatusCode::PAYLOAD_TOO_LARGE;
    }
    match err.category() {
        ErrorCategory::Input => StatusCode::BAD_REQUEST,
        ErrorCategory::Document => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Upstream => StatusCode::BAD_GATEWAY,
        ErrorCategory::Configuration | ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_title(err: &ValidatorError) -> String {
    match err {
        ValidatorError::InputError { title, .. } => title.clone(),
        ValidatorError::UploadTooLarge { .. } => "Upload too large".to_string(),
        other => match other.category() {
            ErrorCategory::Input => "Invalid input",
            ErrorCategory::Document => "Document could not be processed",
            ErrorCategory::Upstream => "Extraction service failure",
            ErrorCategory::Configuration => "Configuration problem",
            ErrorCategory::System => "Internal error",
        }
        .to_string(),
    }
}

/// JSON error body: `{error, category, message, suggestion}`.
pub struct ApiError(pub ValidatorError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!("Validation failed: {} (category {:?})", err, err.category());
        } else {
            tracing::warn!("Validation rejected: {}", err);
        }

        let message = match &err {
            ValidatorError::InputError { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let body = json!({
            "error": error_title(&err),
            "category": err.category().as_str(),
            "message": message,
            "suggestion": err.recovery_suggestion(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<ValidatorError> for ApiError {
    fn from(err: ValidatorError) -> Self {
        ApiError(err)
    }
}

/// Uploaded files, kept on disk for the lifetime of one request.
struct Uploads {
    dir: TempDir,
    names: Vec<String>,
}

fn upload_name(raw: &str, taken: &[String]) -> Option<String> {
    let name = Path::new(raw).file_name()?.to_str()?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    if !taken.contains(&name) {
        return Some(name);
    }
    (taken.len()..)
        .map(|n| format!("{}_{}", n, name))
        .find(|candidate| !taken.contains(candidate))
}

fn upload_error(err: MultipartError) -> ValidatorError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidatorError::UploadTooLarge {
            message: err.body_text(),
        }
    } else {
        ValidatorError::input("Invalid upload", err.body_text())
    }
}

async fn save_uploads(mut multipart: Multipart) -> Result<Uploads> {
    let dir = tempfile::Builder::new().prefix("gamefik-upload-").tempdir()?;
    let mut names = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let Some(name) = field.file_name().and_then(|raw| upload_name(raw, &names)) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(upload_error)?;

        tokio::fs::write(dir.path().join(&name), &bytes).await?;
        tracing::debug!("Saved upload {} ({} bytes)", name, bytes.len());
        names.push(name);
    }

    Ok(Uploads { dir, names })
}

fn strip_dir(path: &str, dir: &Path) -> String {
    Path::new(path)
        .strip_prefix(dir)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}

// Reports show upload names rather than temp paths
fn relabel(crm: &mut CrmOutcome, dir: &Path) {
    for path in crm.succeeded.iter_mut() {
        *path = strip_dir(path, dir);
    }
    for failure in crm.failed.iter_mut() {
        failure.path = strip_dir(&failure.path, dir);
    }
}

async fn review_uploads<E, L, S>(engine: &ReviewEngine<E, L, S>, multipart: Multipart) -> Result<ReviewReport>
where
    E: TextExtractor,
    L: LlmClient,
    S: Storage,
{
    let uploads = save_uploads(multipart).await?;
    let (images, pdf) = split_uploads(&uploads.names)?;

    let image_paths: Vec<PathBuf> = images.iter().map(|name| uploads.dir.path().join(name.as_str())).collect();
    let pdf_path = uploads.dir.path().join(pdf.as_str());

    let mut report = engine.review(&image_paths, &pdf_path).await?;
    relabel(&mut report.crm, uploads.dir.path());
    report.contract_file = strip_dir(&report.contract_file, uploads.dir.path());
    Ok(report)
}

async fn index() -> Html<String> {
    Html(render::index_page())
}

async fn health() -> &'static str {
    "OK"
}

async fn validate_page<E, L, S>(State(engine): State<Arc<ReviewEngine<E, L, S>>>, multipart: Multipart) -> Response
where
    E: TextExtractor,
    L: LlmClient,
    S: Storage,
{
    match review_uploads(&engine, multipart).await {
        Ok(report) => Html(render::result_page(&report)).into_response(),
        Err(err) => {
            tracing::warn!("Validation failed: {}", err);
            (status_for(&err), Html(render::error_page(&error_title(&err), &err))).into_response()
        }
    }
}

async fn api_validate<E, L, S>(
    State(engine): State<Arc<ReviewEngine<E, L, S>>>,
    multipart: Multipart,
) -> std::result::Result<Json<ReviewReport>, ApiError>
where
    E: TextExtractor,
    L: LlmClient,
    S: Storage,
{
    let report = review_uploads(&engine, multipart).await?;
    Ok(Json(report))
}

pub fn router<E, L, S>(engine: Arc<ReviewEngine<E, L, S>>, max_upload_bytes: usize) -> Router
where
    E: TextExtractor + 'static,
    L: LlmClient + 'static,
    S: Storage + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/validate", post(validate_page::<E, L, S>))
        .route("/api/validate", post(api_validate::<E, L, S>))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
