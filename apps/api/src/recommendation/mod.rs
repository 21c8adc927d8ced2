// Recommendation Engine: profile text + bounded job list -> model prose.
// All model calls go through llm_client.

pub mod engine;
pub mod prompts;

pub use engine::{LlmRecommender, Recommender};
