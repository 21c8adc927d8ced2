// Prompt constants for the Recommendation Engine.

/// Recommendation prompt template. Replace `{skills}` and `{jobs}` before sending.
///
/// "Top 5" is a request to the model, not something the service checks.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"
You are an AI job recommendation assistant.
Given these skills: {skills}
and these job postings: {jobs}
Recommend the top 5 most suitable jobs and explain briefly why each is a good match.
"#;
