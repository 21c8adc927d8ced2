// Orchestrator: validates input, fetches jobs, extracts the résumé, ranks.
// Handlers translate a finished run into the HTTP response.

pub mod handlers;
pub mod orchestrator;

pub use orchestrator::{run, Notice, PipelineError, RunReport, RunRequest, RunState};
