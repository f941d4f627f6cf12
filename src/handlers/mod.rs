// Handlers module

pub mod extract;
pub mod health;
pub mod image;
pub mod voice;

use bytes::Buf;
use futures_util::TryStreamExt;
use warp::multipart::{FormData, Part};
use warp::Rejection;

use crate::error::{reject, GatewayError};

/// One decoded multipart field
pub(crate) struct FormField {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl FormField {
    /// Interpret the field value as text (for non-file fields).
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Lowercase extension of the uploaded file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_lowercase())
        }
    }
}

/// Drain a multipart form into (field name, field) pairs.
pub(crate) async fn read_form(mut form: FormData) -> Result<Vec<(String, FormField)>, Rejection> {
    let mut fields = Vec::new();
    while let Some(part) = form
        .try_next()
        .await
        .map_err(|e| reject(GatewayError::BadRequest(format!("invalid multipart body: {}", e))))?
    {
        let name = part.name().to_string();
        let file_name = part.filename().map(str::to_string);
        let bytes = part_bytes(part).await?;
        fields.push((name, FormField { file_name, bytes }));
    }
    Ok(fields)
}

async fn part_bytes(part: Part) -> Result<Vec<u8>, Rejection> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, mut buf| async move {
            while buf.has_remaining() {
                let chunk = buf.chunk();
                acc.extend_from_slice(chunk);
                let advance = chunk.len();
                buf.advance(advance);
            }
            Ok(acc)
        })
        .await
        .map_err(|e| reject(GatewayError::BadRequest(format!("failed to read upload: {}", e))))
}

/// Pull a named field out of a drained form.
pub(crate) fn take_field(
    fields: &mut Vec<(String, FormField)>,
    name: &str,
) -> Option<FormField> {
    let index = fields.iter().position(|(n, _)| n == name)?;
    Some(fields.remove(index).1)
}
