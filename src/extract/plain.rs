//! Plain-text and CSV extraction

use serde_json::json;

use super::Extracted;

/// Decode the bytes as UTF-8, replacing invalid sequences.
pub fn extract(data: &[u8]) -> Extracted {
    let text = String::from_utf8_lossy(data).into_owned();
    let lines = text.lines().count();
    Extracted {
        metadata: json!({ "lines": lines, "bytes": data.len() }),
        text,
    }
}
