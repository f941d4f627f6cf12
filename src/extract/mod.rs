//! Local document text extraction
//!
//! Pulls plain text (plus light structural metadata) out of uploaded
//! documents without calling any upstream service. Office formats are
//! handled by unzipping the OOXML container and walking its XML parts.

pub mod ooxml;
pub mod pdf;
pub mod plain;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Malformed {kind} document: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

/// Text extracted from a document, with per-format metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub text: String,
    pub metadata: serde_json::Value,
}

/// Extract text from raw document bytes, dispatching on the file type
/// (a lowercase extension without the leading dot).
pub fn extract_bytes(data: &[u8], file_type: &str) -> Result<Extracted, ExtractError> {
    match file_type.to_lowercase().as_str() {
        "txt" | "csv" => Ok(plain::extract(data)),
        "docx" => ooxml::extract_docx(data),
        "xlsx" => ooxml::extract_xlsx(data),
        "pptx" => ooxml::extract_pptx(data),
        "pdf" => pdf::extract(data),
        other => Err(ExtractError::UnsupportedType(other.to_string())),
    }
}
