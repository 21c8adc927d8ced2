use std::sync::Arc;

use crate::config::Config;
use crate::jobs::{JobSource, SerpApiClient};
use crate::llm_client::LlmClient;
use crate::recommendation::{LlmRecommender, Recommender};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Job search backend. Default: SerpAPI Google Jobs.
    pub jobs: Arc<dyn JobSource>,
    /// Ranking backend. Default: Groq-hosted model.
    pub recommender: Arc<dyn Recommender>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let jobs = Arc::new(SerpApiClient::new(&config));
        let recommender = Arc::new(LlmRecommender(LlmClient::new(&config)));
        Self {
            config: Arc::new(config),
            jobs,
            recommender,
        }
    }
}
