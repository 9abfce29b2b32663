use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Router,
    extract::{
        DefaultBodyLimit, Multipart, Path as UrlPath, State, multipart::MultipartError,
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use sha1::{Digest, Sha1};
use tracing::{error, info, warn};

use crate::export::workbook::{BATCH_WORKBOOK_NAME, ResultSet, URL_WORKBOOK_NAME};
use crate::pipeline::batch::{SkippedItem, process_archive_reader, validate_archive_name};
use crate::pipeline::error::PipelineError;
use crate::pipeline::runner::Pipeline;
use crate::pipeline::single::process_url;
use crate::report::html::{render_error, render_home, render_results};

const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub upload_dir: PathBuf,
}

/// What the form asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Zip { file_name: String, bytes: Vec<u8> },
    Url(String),
}

/// A finished run, ready to render.
#[derive(Debug)]
pub struct RunView {
    pub results: ResultSet,
    pub skipped: Vec<SkippedItem>,
    pub workbook_name: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/test_cases", get(home_handler).post(test_cases_handler))
        .route("/download/:run_id/:file", get(download_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn home_handler() -> impl IntoResponse {
    Html(render_home())
}

async fn test_cases_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let submission = match read_submission(multipart).await {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };

    let run_id = run_id(&submission);
    let run_dir = state.upload_dir.join(&run_id);
    let pipeline = state.pipeline.clone();

    // Browser and model calls block; keep them off the async workers.
    let joined =
        tokio::task::spawn_blocking(move || execute(&pipeline, submission, &run_dir)).await;

    match joined {
        Ok(Ok(view)) => {
            let href = format!("/download/{}/{}", run_id, view.workbook_name);
            Html(render_results(&view.results, &href, &view.skipped)).into_response()
        }
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            error!(error = %e, "pipeline task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_error("Unexpected error while generating test cases.")),
            )
                .into_response()
        }
    }
}

async fn download_handler(
    State(state): State<AppState>,
    UrlPath((run_id, file)): UrlPath<(String, String)>,
) -> Response {
    let known_file = file == BATCH_WORKBOOK_NAME || file == URL_WORKBOOK_NAME;
    if !is_run_id(&run_id) || !known_file {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }

    let path = state.upload_dir.join(&run_id).join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "download failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error during download").into_response()
        }
    }
}

// ============================================================================
// Form handling
// ============================================================================

async fn read_submission(mut multipart: Multipart) -> Result<Submission, PipelineError> {
    let mut method = None;
    let mut url = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(unreadable_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "input_method" => method = Some(field.text().await.map_err(unreadable_form)?),
            "url" => url = Some(field.text().await.map_err(unreadable_form)?),
            "zip_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    warn!(error = %e, "upload interrupted");
                    PipelineError::InvalidInputFormat("Could not read the uploaded file.".into())
                })?;
                upload = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    build_submission(method.as_deref(), url, upload)
}

fn unreadable_form(error: MultipartError) -> PipelineError {
    warn!(error = %error, "malformed form submission");
    PipelineError::InvalidInputFormat("Could not read the submitted form.".into())
}

/// Validate the form fields into a submission.
pub fn build_submission(
    method: Option<&str>,
    url: Option<String>,
    upload: Option<(String, Vec<u8>)>,
) -> Result<Submission, PipelineError> {
    match method.map(str::trim) {
        Some("zip_upload") => match upload {
            Some((file_name, bytes)) if !file_name.is_empty() => {
                validate_archive_name(&file_name)?;
                Ok(Submission::Zip { file_name, bytes })
            }
            _ => Err(PipelineError::InvalidInputFormat(
                "Please choose a ZIP file to upload.".into(),
            )),
        },
        Some("url_input") => match url.map(|u| u.trim().to_string()) {
            Some(u) if !u.is_empty() => Ok(Submission::Url(u)),
            _ => Err(PipelineError::InvalidInputFormat("Please enter a URL.".into())),
        },
        _ => Err(PipelineError::InvalidInputFormat(
            "Please choose an input method.".into(),
        )),
    }
}

/// Run a submission to completion, writing its workbook under `run_dir`.
pub fn execute(
    pipeline: &Pipeline,
    submission: Submission,
    run_dir: &Path,
) -> Result<RunView, PipelineError> {
    match submission {
        Submission::Zip { file_name, bytes } => {
            info!(archive = %file_name, bytes = bytes.len(), "batch request");
            let output = run_dir.join(BATCH_WORKBOOK_NAME);
            let outcome = process_archive_reader(pipeline, Cursor::new(bytes), &output)?;
            Ok(RunView {
                results: outcome.results,
                skipped: outcome.skipped,
                workbook_name: BATCH_WORKBOOK_NAME,
            })
        }
        Submission::Url(url) => {
            let output = run_dir.join(URL_WORKBOOK_NAME);
            let outcome = process_url(pipeline, &url, &output)?;
            Ok(RunView {
                results: outcome.results,
                skipped: Vec::new(),
                workbook_name: URL_WORKBOOK_NAME,
            })
        }
    }
}

fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::InvalidInputFormat(_) | PipelineError::NoContentFound(_) => {
            StatusCode::BAD_REQUEST
        }
        PipelineError::ExtractionFailure { .. } | PipelineError::GenerationFailure { .. } => {
            StatusCode::BAD_GATEWAY
        }
        PipelineError::EmptyResult { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::ExportFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &PipelineError) -> Response {
    warn!(kind = error.kind(), error = %error, "request failed");
    (status_for(error), Html(render_error(&error.user_message()))).into_response()
}

// ============================================================================
// Run directories
// ============================================================================

/// Per-run directory name: SHA-1 of the input and the current time.
pub fn run_id(submission: &Submission) -> String {
    let mut hasher = Sha1::new();
    match submission {
        Submission::Zip { file_name, bytes } => {
            hasher.update(file_name.as_bytes());
            hasher.update(bytes);
        }
        Submission::Url(url) => hasher.update(url.as_bytes()),
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    hasher.update(nanos.to_le_bytes());

    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

fn is_run_id(s: &str) -> bool {
    s.len() == 16 && s.chars().all(|c| c.is_ascii_hexdigit())
}
