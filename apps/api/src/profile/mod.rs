// Profile Extractor: turns an uploaded résumé into plain profile text.

pub mod extract;

pub use extract::{extract_text, preview, DocumentKind, ExtractError};

/// An uploaded résumé held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    /// Extracts text on the blocking pool. Parser panics become `ExtractError::Aborted`.
    pub async fn extract(self) -> Result<String, ExtractError> {
        let kind = DocumentKind::from_filename(&self.filename)?;
        tokio::task::spawn_blocking(move || extract_text(kind, &self.bytes))
            .await
            .map_err(|e| ExtractError::Aborted(e.to_string()))?
    }
}
