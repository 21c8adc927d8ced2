//! Résumé text extraction for the two supported upload formats.

use std::io::Cursor;

use docx_rust::document::BodyContent;
use docx_rust::DocxFile;
use serde::Serialize;
use thiserror::Error;

use crate::jobs::record::truncate_with_ellipsis;

const PREVIEW_CHARS: usize = 800;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported document format: {0} (expected .pdf or .docx)")]
    UnsupportedFormat(String),

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Failed to parse DOCX: {0}")]
    Docx(String),

    #[error("Document parser aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Picks the parser from the uploaded file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let lower = filename.trim().to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(DocumentKind::Docx)
        } else {
            Err(ExtractError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// Extracts plain text from `bytes`. CPU-bound; call from a blocking context.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(join_pages(pages))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let file =
        DocxFile::from_reader(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let docx = file.parse().map_err(|e| ExtractError::Docx(e.to_string()))?;

    let paragraphs = docx.document.body.content.iter().filter_map(|content| match content {
        BodyContent::Paragraph(p) => Some(p.text()),
        _ => None,
    });
    Ok(join_paragraphs(paragraphs))
}

/// Joins page texts in order. Pages without text contribute nothing.
pub fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages
        .into_iter()
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Joins paragraph texts in order, skipping empty paragraphs.
pub fn join_paragraphs<I>(paragraphs: I) -> String
where
    I: IntoIterator<Item = String>,
{
    paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Short excerpt of extracted text for confirmation in the UI.
pub fn preview(text: &str) -> String {
    truncate_with_ellipsis(text, PREVIEW_CHARS)
}
