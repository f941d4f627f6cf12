//! PDF text extraction

use lopdf::Document;
use serde_json::json;

use super::{ExtractError, Extracted};

/// Extract text page by page; pages whose content streams cannot be decoded
/// are skipped rather than failing the whole document.
pub fn extract(data: &[u8]) -> Result<Extracted, ExtractError> {
    let document = Document::load_mem(data).map_err(|e| ExtractError::Malformed {
        kind: "pdf",
        reason: e.to_string(),
    })?;

    let pages = document.get_pages();
    let page_count = pages.len();
    let mut texts = Vec::with_capacity(page_count);

    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "Skipping unreadable PDF page");
            }
        }
    }

    Ok(Extracted {
        text: texts.join("\n"),
        metadata: json!({ "pages": page_count }),
    })
}
