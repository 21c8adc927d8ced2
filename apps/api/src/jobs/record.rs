//! Job records: normalization of the provider's loosely-typed job objects.
//!
//! The search provider does not enforce a schema, so every field is read
//! through a list of candidate keys. Ambiguity stops here: everything past
//! `JobRecord::from_provider` sees a strict shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const TITLE_KEYS: &[&str] = &["title", "position"];
const COMPANY_KEYS: &[&str] = &["company_name", "company"];
const LOCATION_KEYS: &[&str] = &["location"];
const DESCRIPTION_KEYS: &[&str] = &["description", "snippet"];
const LINK_KEYS: &[&str] = &["link", "apply_link"];

pub const UNTITLED: &str = "No title";
const NOT_AVAILABLE: &str = "N/A";
const NO_LINK: &str = "#";

/// Characters of description shown per listing card.
pub const LISTING_DESCRIPTION_CHARS: usize = 300;
/// Characters of description sent to the model per job.
pub const SNIPPET_CHARS: usize = 400;

/// A job posting as returned by the provider, resolved into a strict shape.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Job board the posting came through, e.g. "LinkedIn".
    pub via: Option<String>,
    /// Untouched provider object, kept for debug output only.
    pub raw: Value,
}

impl JobRecord {
    /// Resolves a provider object. Returns `None` for anything that is not a JSON object.
    pub fn from_provider(raw: Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }

        let link = first_str(&raw, LINK_KEYS)
            .or_else(|| {
                raw.get("apply_options")
                    .and_then(|v| v.as_array())
                    .and_then(|options| options.iter().find_map(|o| first_str(o, &["link"])))
            })
            .or_else(|| first_str(&raw, &["share_link"]));

        Some(Self {
            title: first_str(&raw, TITLE_KEYS).unwrap_or_else(|| UNTITLED.to_string()),
            company: first_str(&raw, COMPANY_KEYS),
            location: first_str(&raw, LOCATION_KEYS),
            description: first_str(&raw, DESCRIPTION_KEYS),
            link,
            via: first_str(&raw, &["via"]),
            raw,
        })
    }

    pub fn listing(&self) -> JobListing {
        let description = self
            .description
            .as_deref()
            .map(|d| truncate_with_ellipsis(d, LISTING_DESCRIPTION_CHARS));

        JobListing {
            title: self.title.clone(),
            company: self.company.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            location: self.location.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            description,
            link: self.link.clone().unwrap_or_else(|| NO_LINK.to_string()),
            via: self.via.clone(),
        }
    }

    pub fn simplified(&self) -> SimplifiedJobRecord {
        SimplifiedJobRecord {
            title: self.title.clone(),
            company: self.company.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            snippet: self
                .description
                .as_deref()
                .map(|d| truncate_chars(d, SNIPPET_CHARS).to_string())
                .unwrap_or_default(),
        }
    }
}

/// Display card for a fetched job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: Option<String>,
    pub link: String,
    pub via: Option<String>,
}

/// The bounded projection of a job that is handed to the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedJobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub snippet: String,
}

/// Optional job-type filter understood by the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    Internship,
    FullTime,
    PartTime,
    Contract,
    Remote,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::Internship,
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Remote,
    ];

    /// Value sent to the provider.
    pub fn as_param(&self) -> &'static str {
        match self {
            JobType::Internship => "Internship",
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Remote => "Remote",
        }
    }

    /// Parses user input. Blank input means "no filter"; unknown values are rejected.
    pub fn parse_optional(input: &str) -> Result<Option<Self>, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        Self::ALL
            .iter()
            .find(|t| t.as_param().eq_ignore_ascii_case(input))
            .copied()
            .map(Some)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|t| t.as_param()).collect();
                format!(
                    "unknown job_type '{input}' (expected one of: {})",
                    allowed.join(", ")
                )
            })
    }
}

/// First non-empty string among `keys`, in order.
fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    let head = truncate_chars(text, max);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_keys_win() {
        let record = JobRecord::from_provider(json!({
            "title": "Data Analyst",
            "position": "ignored",
            "company_name": "Acme",
            "company": "ignored",
            "location": "Bengaluru, Karnataka",
            "description": "Analyze things",
            "snippet": "ignored",
            "link": "https://jobs.example/1",
            "via": "LinkedIn"
        }))
        .unwrap();

        assert_eq!(record.title, "Data Analyst");
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert_eq!(record.location.as_deref(), Some("Bengaluru, Karnataka"));
        assert_eq!(record.description.as_deref(), Some("Analyze things"));
        assert_eq!(record.link.as_deref(), Some("https://jobs.example/1"));
        assert_eq!(record.via.as_deref(), Some("LinkedIn"));
    }

    #[test]
    fn test_alternate_keys_are_used_when_primary_missing_or_empty() {
        let record = JobRecord::from_provider(json!({
            "title": "",
            "position": "BI Developer",
            "company": "Globex",
            "snippet": "Dashboards",
            "apply_link": "https://apply.example/2"
        }))
        .unwrap();

        assert_eq!(record.title, "BI Developer");
        assert_eq!(record.company.as_deref(), Some("Globex"));
        assert_eq!(record.description.as_deref(), Some("Dashboards"));
        assert_eq!(record.link.as_deref(), Some("https://apply.example/2"));
    }

    #[test]
    fn test_link_falls_back_to_apply_options_then_share_link() {
        let record = JobRecord::from_provider(json!({
            "apply_options": [{"title": "Indeed"}, {"title": "Naukri", "link": "https://naukri.example/3"}],
            "share_link": "https://share.example/3"
        }))
        .unwrap();
        assert_eq!(record.link.as_deref(), Some("https://naukri.example/3"));

        let record = JobRecord::from_provider(json!({"share_link": "https://share.example/4"})).unwrap();
        assert_eq!(record.link.as_deref(), Some("https://share.example/4"));
    }

    #[test]
    fn test_non_string_fields_are_treated_as_absent() {
        let record = JobRecord::from_provider(json!({"title": 42, "company_name": null})).unwrap();
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.company, None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(JobRecord::from_provider(json!("just a string")).is_none());
        assert!(JobRecord::from_provider(json!([1, 2])).is_none());
    }

    #[test]
    fn test_listing_defaults() {
        let listing = JobRecord::from_provider(json!({})).unwrap().listing();
        assert_eq!(listing.title, "No title");
        assert_eq!(listing.company, "N/A");
        assert_eq!(listing.location, "N/A");
        assert_eq!(listing.description, None);
        assert_eq!(listing.link, "#");
    }

    #[test]
    fn test_listing_truncates_description_to_300_chars() {
        let long = "x".repeat(450);
        let listing = JobRecord::from_provider(json!({"description": long}))
            .unwrap()
            .listing();
        let description = listing.description.unwrap();
        assert_eq!(description.chars().count(), 303);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_simplified_defaults_to_empty_strings_and_truncates_snippet() {
        let long = "é".repeat(500);
        let simplified = JobRecord::from_provider(json!({"title": "Analyst", "description": long}))
            .unwrap()
            .simplified();

        assert_eq!(simplified.title, "Analyst");
        assert_eq!(simplified.company, "");
        assert_eq!(simplified.location, "");
        assert_eq!(simplified.snippet.chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
        assert_eq!(truncate_with_ellipsis("abcd", 3), "abc...");
    }

    #[test]
    fn test_job_type_parse() {
        assert_eq!(JobType::parse_optional("").unwrap(), None);
        assert_eq!(JobType::parse_optional("  ").unwrap(), None);
        assert_eq!(
            JobType::parse_optional("full-time").unwrap(),
            Some(JobType::FullTime)
        );
        assert_eq!(
            JobType::parse_optional("Internship").unwrap(),
            Some(JobType::Internship)
        );
        assert!(JobType::parse_optional("Freelance").is_err());
    }

    #[test]
    fn test_job_type_params_round_trip_through_parse() {
        for job_type in JobType::ALL {
            assert_eq!(
                JobType::parse_optional(job_type.as_param()).unwrap(),
                Some(job_type)
            );
        }
    }
}
