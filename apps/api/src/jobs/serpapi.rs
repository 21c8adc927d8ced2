//! SerpAPI client for the `google_jobs` engine.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::jobs::record::{JobRecord, JobType};
use crate::jobs::JobSource;

const ENGINE: &str = "google_jobs";
const RESULTS_FIELD: &str = "jobs_results";
pub const DEFAULT_LOCATION: &str = "India";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SERPAPI_KEY is not configured")]
    NoApiKey,

    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse search response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One job search.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub query: String,
    pub location: String,
    pub job_type: Option<JobType>,
}

impl JobQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: DEFAULT_LOCATION.to_string(),
            job_type: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_job_type(mut self, job_type: Option<JobType>) -> Self {
        self.job_type = job_type;
        self
    }
}

/// Query parameters for one search. `job_type` is only present when a filter is set.
pub fn search_params(query: &JobQuery, api_key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("engine", ENGINE.to_string()),
        ("q", query.query.clone()),
        ("location", query.location.clone()),
        ("api_key", api_key.to_string()),
    ];
    if let Some(job_type) = query.job_type {
        params.push(("job_type", job_type.as_param().to_string()));
    }
    params
}

/// Pulls the job list out of a provider response.
///
/// A missing or non-array results field is an ordinary "nothing found" outcome.
pub fn parse_results(body: &Value) -> Vec<JobRecord> {
    let Some(results) = body.get(RESULTS_FIELD).and_then(|v| v.as_array()) else {
        if let Some(message) = body.get("error").and_then(|v| v.as_str()) {
            warn!(error = %message, "Search provider returned no results field");
        } else {
            debug!("Search response has no '{RESULTS_FIELD}' field");
        }
        return Vec::new();
    };

    let total = results.len();
    let records: Vec<JobRecord> = results
        .iter()
        .cloned()
        .filter_map(JobRecord::from_provider)
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "Skipped job results that were not JSON objects"
        );
    }
    records
}

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.serpapi_key.clone(),
            base_url: config.serpapi_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JobSource for SerpApiClient {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::NoApiKey)?;

        info!(
            query = %query.query,
            location = %query.location,
            job_type = query.job_type.map(|t| t.as_param()).unwrap_or("any"),
            "Searching Google Jobs via SerpAPI"
        );

        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&search_params(query, api_key))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // An exhausted quota comes back as 429 with an `error` body and no results.
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
            return Ok(parse_results(&body));
        }

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(&body)?;
        let records = parse_results(&body);

        info!(count = records.len(), "Google Jobs search completed");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_params_include_fixed_engine_and_default_location() {
        let params = search_params(&JobQuery::new("Data Analyst"), "k");
        assert_eq!(param(&params, "engine"), Some("google_jobs"));
        assert_eq!(param(&params, "q"), Some("Data Analyst"));
        assert_eq!(param(&params, "location"), Some("India"));
        assert_eq!(param(&params, "api_key"), Some("k"));
    }

    #[test]
    fn test_params_omit_job_type_when_unset() {
        let params = search_params(&JobQuery::new("Data Analyst"), "k");
        assert!(params.iter().all(|(k, _)| *k != "job_type"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_params_include_every_job_type() {
        for job_type in JobType::ALL {
            let query = JobQuery::new("Data Analyst").with_job_type(Some(job_type));
            let params = search_params(&query, "k");
            assert_eq!(param(&params, "job_type"), Some(job_type.as_param()));
        }
    }

    #[test]
    fn test_parse_results_missing_field_is_empty() {
        assert!(parse_results(&json!({"search_metadata": {"status": "Success"}})).is_empty());
        assert!(parse_results(&json!({"error": "Google hasn't returned any results"})).is_empty());
        assert!(parse_results(&json!({"jobs_results": "not an array"})).is_empty());
    }

    #[test]
    fn test_parse_results_skips_non_objects() {
        let records = parse_results(&json!({
            "jobs_results": [{"title": "A"}, "junk", {"title": "B"}]
        }));
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_search_sends_params_and_reads_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("engine".into(), "google_jobs".into()),
                Matcher::UrlEncoded("q".into(), "Data Analyst".into()),
                Matcher::UrlEncoded("location".into(), "Pune".into()),
                Matcher::UrlEncoded("api_key".into(), "serp-test-key".into()),
                Matcher::UrlEncoded("job_type".into(), "Part-time".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jobs_results": [
                        {"title": "Data Analyst", "company_name": "Acme", "location": "Pune"},
                        {"position": "Junior Analyst", "company": "Initech"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SerpApiClient::new(&Config::for_tests(&server.url()));
        let query = JobQuery::new("Data Analyst")
            .with_location("Pune")
            .with_job_type(Some(JobType::PartTime));
        let records = client.search(&query).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Junior Analyst");
        assert_eq!(records[1].company.as_deref(), Some("Initech"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_without_results_field_returns_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "Google hasn't returned any results for this query."}"#)
            .create_async()
            .await;

        let client = SerpApiClient::new(&Config::for_tests(&server.url()));
        let records = client.search(&JobQuery::new("Underwater Basket Weaver")).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_search_auth_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": "Invalid API key."}"#)
            .create_async()
            .await;

        let client = SerpApiClient::new(&Config::for_tests(&server.url()));
        match client.search(&JobQuery::new("Data Analyst")).await {
            Err(SearchError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_quota_exhausted_returns_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error": "Your account has run out of searches."}"#)
            .create_async()
            .await;

        let client = SerpApiClient::new(&Config::for_tests(&server.url()));
        let records = client.search(&JobQuery::new("Data Analyst")).await.unwrap();

        assert!(records.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_forbidden_is_still_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": "Account suspended."}"#)
            .create_async()
            .await;

        let client = SerpApiClient::new(&Config::for_tests(&server.url()));
        let err = client.search(&JobQuery::new("Data Analyst")).await.unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = SerpApiClient::new(&Config::for_tests(&server.url()));
        let err = client.search(&JobQuery::new("Data Analyst")).await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_search_network_failure_is_an_error() {
        let client = SerpApiClient::new(&Config::for_tests("http://127.0.0.1:1"));
        let err = client.search(&JobQuery::new("Data Analyst")).await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
    }

    #[tokio::test]
    async fn test_search_without_key_is_config_error() {
        let mut config = Config::for_tests("http://127.0.0.1:1");
        config.serpapi_key = None;

        let err = SerpApiClient::new(&config)
            .search(&JobQuery::new("Data Analyst"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NoApiKey));
    }
}
