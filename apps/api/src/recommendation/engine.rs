//! Recommendation Engine: asks the language model to pick and justify the best matches.
//!
//! The model's reply is returned verbatim. Nothing here parses which jobs were
//! chosen or how many; the output is advisory prose.

use async_trait::async_trait;
use tracing::info;

use crate::jobs::SimplifiedJobRecord;
use crate::llm_client::{LlmClient, LlmError};
use crate::recommendation::prompts::RECOMMENDATION_PROMPT_TEMPLATE;

const SKILLS_PLACEHOLDER: &str = "{skills}";
const JOBS_PLACEHOLDER: &str = "{jobs}";

/// Swappable ranking backend. Carried in `AppState` as `Arc<dyn Recommender>`.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        profile: &str,
        jobs: &[SimplifiedJobRecord],
    ) -> Result<String, LlmError>;
}

/// Production recommender backed by the hosted model.
pub struct LlmRecommender(pub LlmClient);

#[async_trait]
impl Recommender for LlmRecommender {
    async fn recommend(
        &self,
        profile: &str,
        jobs: &[SimplifiedJobRecord],
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(profile, jobs);
        info!(
            jobs = jobs.len(),
            prompt_chars = prompt.len(),
            model = self.0.model(),
            "Requesting job recommendations"
        );
        self.0.complete(&prompt).await
    }
}

/// One line per job: `<title> at <company> (<location>)`, in input order.
pub fn render_job_lines(jobs: &[SimplifiedJobRecord]) -> String {
    jobs.iter()
        .map(|job| format!("{} at {} ({})", job.title, job.company, job.location))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fills the template in a single pass, so placeholder-like text inside the
/// profile or job titles is left alone.
pub fn build_prompt(profile: &str, jobs: &[SimplifiedJobRecord]) -> String {
    let job_lines = render_job_lines(jobs);
    let template = RECOMMENDATION_PROMPT_TEMPLATE;

    match template
        .split_once(SKILLS_PLACEHOLDER)
        .and_then(|(head, rest)| rest.split_once(JOBS_PLACEHOLDER).map(|(mid, tail)| (head, mid, tail)))
    {
        Some((head, mid, tail)) => format!("{head}{profile}{mid}{job_lines}{tail}"),
        None => template
            .replace(SKILLS_PLACEHOLDER, profile)
            .replace(JOBS_PLACEHOLDER, &job_lines),
    }
}
