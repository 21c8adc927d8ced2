use anyhow::{Context, Result};

pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";

/// Application configuration loaded from environment variables.
///
/// Provider keys are optional at startup. A missing key is reported by the
/// client that needs it, on its first call.
#[derive(Debug, Clone)]
pub struct Config {
    pub serpapi_key: Option<String>,
    pub serpapi_base_url: String,
    pub groq_api_key: Option<String>,
    pub groq_api_base: String,
    pub groq_model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            serpapi_key: optional_env("SERPAPI_KEY"),
            serpapi_base_url: optional_env("SERPAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERPAPI_BASE_URL.to_string()),
            groq_api_key: optional_env("GROQ_API_KEY"),
            groq_api_base: optional_env("GROQ_API_BASE")
                .unwrap_or_else(|| DEFAULT_GROQ_API_BASE.to_string()),
            groq_model: optional_env("GROQ_MODEL")
                .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an environment variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Config pointing both providers at a local mock server.
    pub fn for_tests(base_url: &str) -> Self {
        Config {
            serpapi_key: Some("serp-test-key".to_string()),
            serpapi_base_url: base_url.to_string(),
            groq_api_key: Some("groq-test-key".to_string()),
            groq_api_base: base_url.to_string(),
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
