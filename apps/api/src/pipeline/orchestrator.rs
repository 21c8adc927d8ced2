//! Recommendation pipeline. Drives one request from user input to ranked prose.
//!
//! Flow: validate → (extract résumé ‖ fetch jobs) → normalize + cap → rank.
//!
//! Every external failure is caught here and recorded on the `RunReport`;
//! nothing propagates past `run`. A ranking failure keeps the fetched listing.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::jobs::{JobListing, JobQuery, JobSource, JobType, SearchError, SimplifiedJobRecord};
use crate::llm_client::LlmError;
use crate::profile::{preview, ExtractError, ResumeUpload};
use crate::recommendation::Recommender;

pub const DEFAULT_MAX_JOBS: usize = 10;
pub const MAX_JOBS_RANGE: std::ops::RangeInclusive<usize> = 3..=25;
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;
pub const MAX_RECOMMENDATIONS_RANGE: std::ops::RangeInclusive<usize> = 1..=10;
/// Raw provider objects echoed back when debugging is requested.
const RAW_JOBS_SHOWN: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Run state & outcomes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    AwaitingInput,
    Fetching,
    Ranking,
    Done,
    Failed,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Job search failed: {0}")]
    Source(#[from] SearchError),

    #[error("AI recommendation failed: {0}")]
    Recommendation(#[from] LlmError),
}

/// Non-fatal conditions surfaced alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    /// The résumé could not be read; the query stands in for the profile.
    ExtractionFailed(String),
    /// No profile text was available; recommendations will be generic.
    GenericProfile,
    /// The search succeeded but matched nothing.
    EmptyResults,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub query: String,
    pub location: Option<String>,
    /// Raw job-type input; blank means no filter.
    pub job_type: Option<String>,
    pub max_jobs: Option<usize>,
    pub max_recommendations: Option<usize>,
    pub profile_text: Option<String>,
    pub resume: Option<ResumeUpload>,
    pub include_raw: bool,
}

impl RunRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: None,
            job_type: None,
            max_jobs: None,
            max_recommendations: None,
            profile_text: None,
            resume: None,
            include_raw: false,
        }
    }
}

/// Input that passed validation.
#[derive(Debug, Clone)]
struct ValidInput {
    search: JobQuery,
    max_jobs: usize,
    max_recommendations: usize,
}

#[derive(Debug)]
pub struct RunReport {
    pub request_id: Uuid,
    pub state: RunState,
    pub failure: Option<PipelineError>,
    pub notices: Vec<Notice>,
    /// Number of records the provider returned, before capping.
    pub total_fetched: usize,
    pub jobs: Vec<JobListing>,
    /// Exactly what was handed to the recommender.
    pub ranked_input: Vec<SimplifiedJobRecord>,
    pub recommendations: Option<String>,
    /// Advisory only; the model's output is never counted against it.
    pub requested_recommendations: usize,
    pub profile_preview: Option<String>,
    pub raw_jobs: Option<Vec<Value>>,
}

impl RunReport {
    fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            state: RunState::Idle,
            failure: None,
            notices: Vec::new(),
            total_fetched: 0,
            jobs: Vec::new(),
            ranked_input: Vec::new(),
            recommendations: None,
            requested_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            profile_preview: None,
            raw_jobs: None,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state transition");
        self.state = next;
    }

    fn fail(mut self, error: PipelineError) -> Self {
        warn!(error = %error, "Pipeline failed");
        self.advance(RunState::Failed);
        self.failure = Some(error);
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs one recommendation request end to end.
pub async fn run(
    request: RunRequest,
    jobs: &dyn JobSource,
    recommender: &dyn Recommender,
) -> RunReport {
    let request_id = Uuid::new_v4();
    let span = info_span!("recommendation_run", %request_id);
    run_inner(RunReport::new(request_id), request, jobs, recommender)
        .instrument(span)
        .await
}

async fn run_inner(
    mut report: RunReport,
    request: RunRequest,
    jobs: &dyn JobSource,
    recommender: &dyn Recommender,
) -> RunReport {
    report.advance(RunState::AwaitingInput);

    let input = match validate(&request) {
        Ok(input) => input,
        Err(e) => return report.fail(e),
    };
    report.requested_recommendations = input.max_recommendations;

    report.advance(RunState::Fetching);
    let (profile, fetched) = tokio::join!(
        acquire_profile(request.profile_text, request.resume),
        jobs.search(&input.search),
    );

    let profile_text = match profile {
        Ok(Some(text)) => {
            report.profile_preview = Some(preview(&text));
            Some(text)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Résumé extraction failed; falling back to the query");
            report.notices.push(Notice::ExtractionFailed(e.to_string()));
            Some(input.search.query.clone())
        }
    };

    let records = match fetched {
        Ok(records) => records,
        Err(e) => return report.fail(e.into()),
    };

    report.total_fetched = records.len();
    if records.is_empty() {
        info!("Search returned no jobs; skipping ranking");
        report.notices.push(Notice::EmptyResults);
        report.advance(RunState::Done);
        return report;
    }

    let capped = &records[..records.len().min(input.max_jobs)];
    report.jobs = capped.iter().map(|r| r.listing()).collect();
    report.ranked_input = capped.iter().map(|r| r.simplified()).collect();
    if request.include_raw {
        report.raw_jobs = Some(
            records
                .iter()
                .take(RAW_JOBS_SHOWN)
                .map(|r| r.raw.clone())
                .collect(),
        );
    }
    info!(
        fetched = report.total_fetched,
        ranked = report.ranked_input.len(),
        "Jobs fetched"
    );

    let profile_text = profile_text.unwrap_or_else(|| {
        report.notices.push(Notice::GenericProfile);
        input.search.query.clone()
    });

    report.advance(RunState::Ranking);
    let ranked = recommender
        .recommend(&profile_text, &report.ranked_input)
        .await;
    match ranked {
        Ok(text) => {
            report.recommendations = Some(text);
            report.advance(RunState::Done);
            report
        }
        Err(e) => report.fail(e.into()),
    }
}

fn validate(request: &RunRequest) -> Result<ValidInput, PipelineError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(PipelineError::Validation(
            "query cannot be empty".to_string(),
        ));
    }

    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let job_type = match request.job_type.as_deref() {
        Some(raw) => JobType::parse_optional(raw).map_err(PipelineError::Validation)?,
        None => None,
    };

    let max_jobs = bounded(request.max_jobs, DEFAULT_MAX_JOBS, MAX_JOBS_RANGE, "max_jobs")?;
    let max_recommendations = bounded(
        request.max_recommendations,
        DEFAULT_MAX_RECOMMENDATIONS,
        MAX_RECOMMENDATIONS_RANGE,
        "max_recommendations",
    )?;

    let mut search = JobQuery::new(query).with_job_type(job_type);
    if let Some(location) = location {
        search = search.with_location(location);
    }

    Ok(ValidInput {
        search,
        max_jobs,
        max_recommendations,
    })
}

fn bounded(
    value: Option<usize>,
    default: usize,
    range: std::ops::RangeInclusive<usize>,
    name: &str,
) -> Result<usize, PipelineError> {
    let value = value.unwrap_or(default);
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(PipelineError::Validation(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Résumé wins over typed text. `Ok(None)` means no usable profile text.
async fn acquire_profile(
    typed: Option<String>,
    resume: Option<ResumeUpload>,
) -> Result<Option<String>, ExtractError> {
    let text = match resume {
        Some(upload) => upload.extract().await?,
        None => typed.unwrap_or_default(),
    };
    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}
