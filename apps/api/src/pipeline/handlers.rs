//! Axum route handlers for the recommendation API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::JobListing;
use crate::pipeline::{run, Notice, PipelineError, RunReport, RunRequest, RunState};
use crate::profile::{preview, DocumentKind, ResumeUpload};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub request_id: Uuid,
    pub state: RunState,
    pub total_fetched: usize,
    pub jobs: Vec<JobListing>,
    /// Model prose, shown as-is. May list more or fewer than requested.
    pub recommendations: Option<String>,
    pub requested_recommendations: usize,
    pub recommendation_error: Option<String>,
    pub notices: Vec<Notice>,
    pub profile_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_jobs: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: String,
    pub kind: DocumentKind,
    pub chars: usize,
    pub text: String,
    pub preview: String,
}

/// Maps a finished run to the HTTP response.
///
/// Validation and search failures become error responses. A ranking failure is
/// a partial success: the listing is returned with `recommendation_error` set.
fn into_response(report: RunReport) -> Result<RecommendResponse, AppError> {
    let recommendation_error = match report.failure {
        Some(PipelineError::Validation(msg)) => return Err(AppError::Validation(msg)),
        Some(PipelineError::Source(e)) => return Err(AppError::JobSource(e.to_string())),
        Some(PipelineError::Recommendation(e)) => Some(e.to_string()),
        None => None,
    };

    Ok(RecommendResponse {
        request_id: report.request_id,
        state: report.state,
        total_fetched: report.total_fetched,
        jobs: report.jobs,
        recommendations: report.recommendations,
        requested_recommendations: report.requested_recommendations,
        recommendation_error,
        notices: report.notices,
        profile_preview: report.profile_preview,
        raw_jobs: report.raw_jobs,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_form(mut multipart: Multipart) -> Result<RunRequest, AppError> {
    let mut request = RunRequest::new("");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "resume" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read resume: {e}")))?;
            if !bytes.is_empty() {
                request.resume = Some(ResumeUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

        match name.as_str() {
            "query" => request.query = value,
            "location" => request.location = Some(value),
            "job_type" => request.job_type = Some(value),
            "max_jobs" => request.max_jobs = parse_count(&name, &value)?,
            "max_recommendations" => request.max_recommendations = parse_count(&name, &value)?,
            "profile_text" => request.profile_text = Some(value),
            "include_raw" => request.include_raw = parse_flag(&value),
            _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(request)
}

fn parse_count(name: &str, value: &str) -> Result<Option<usize>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<usize>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{name} must be a whole number, got '{value}'")))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommendations
///
/// Multipart form: query, location, job_type, max_jobs, max_recommendations,
/// profile_text, include_raw, and an optional `resume` file (.pdf or .docx).
pub async fn handle_recommend(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RecommendResponse>, AppError> {
    let request = read_form(multipart).await?;
    let report = run(request, state.jobs.as_ref(), state.recommender.as_ref()).await;
    Ok(Json(into_response(report)?))
}

/// POST /api/v1/profile/extract
///
/// Extracts résumé text so the user can check it before searching.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let request = read_form(multipart).await?;
    let upload = request
        .resume
        .ok_or_else(|| AppError::Validation("a 'resume' file is required".to_string()))?;

    let filename = upload.filename.clone();
    let kind = DocumentKind::from_filename(&filename)?;
    let text = upload.extract().await?;

    Ok(Json(ExtractResponse {
        filename,
        kind,
        chars: text.chars().count(),
        preview: preview(&text),
        text,
    }))
}
