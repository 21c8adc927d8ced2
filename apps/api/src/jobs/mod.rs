//! Job Source: fetches job postings from the external search provider.
//!
//! `AppState` holds an `Arc<dyn JobSource>`; `SerpApiClient` is the only
//! production backend.

use async_trait::async_trait;

pub mod record;
pub mod serpapi;

pub use record::{JobListing, JobRecord, JobType, SimplifiedJobRecord};
pub use serpapi::{JobQuery, SearchError, SerpApiClient};

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Runs one search. Zero matches is `Ok(vec![])`, never an error.
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, SearchError>;
}
