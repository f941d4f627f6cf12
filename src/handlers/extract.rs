// Document extraction handlers: POST /api/v1/extract and /api/v1/extract/bytes

use bytes::Bytes;
use serde::Deserialize;
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::{Rejection, Reply};

use crate::error::{reject, GatewayError};
use crate::extract::{self, ExtractError};
use crate::models::ExtractResponse;

use super::{read_form, take_field};

#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    pub file_type: Option<String>,
}

/// Multipart upload: file type comes from the uploaded file's extension.
pub async fn extract_multipart_handler(form: FormData) -> Result<impl Reply, Rejection> {
    let mut fields = read_form(form).await?;
    let file = take_field(&mut fields, "file")
        .ok_or_else(|| reject(GatewayError::BadRequest("No file provided".to_string())))?;

    let file_type = file.extension().ok_or_else(|| {
        reject(GatewayError::BadRequest(
            "Could not determine file type from file name".to_string(),
        ))
    })?;

    run_extraction(file.bytes, file_type).await
}

/// Raw octet-stream upload: file type comes from the `file_type` query
/// parameter.
pub async fn extract_raw_handler(
    query: ExtractQuery,
    body: Bytes,
) -> Result<impl Reply, Rejection> {
    let file_type = query.file_type.ok_or_else(|| {
        reject(GatewayError::BadRequest(
            "Missing file_type query parameter".to_string(),
        ))
    })?;

    run_extraction(body.to_vec(), file_type.to_lowercase()).await
}

async fn run_extraction(data: Vec<u8>, file_type: String) -> Result<impl Reply, Rejection> {
    if data.is_empty() {
        return Err(reject(GatewayError::BadRequest(
            "Empty file".to_string(),
        )));
    }

    tracing::info!(file_type = %file_type, size = data.len(), "Extracting document text");

    // XML and PDF parsing is CPU-bound; keep it off the async runtime.
    let parse_type = file_type.clone();
    let result = tokio::task::spawn_blocking(move || extract::extract_bytes(&data, &parse_type))
        .await
        .map_err(|e| reject(GatewayError::BadRequest(format!("extraction failed: {}", e))))?;

    let response = match result {
        Ok(extracted) => ExtractResponse {
            success: true,
            text: extracted.text,
            file_type,
            metadata: extracted.metadata,
            error: None,
        },
        Err(err @ ExtractError::UnsupportedType(_)) => {
            return Err(reject(GatewayError::Extraction(err)))
        }
        Err(err) => ExtractResponse {
            success: false,
            text: String::new(),
            file_type,
            metadata: serde_json::json!({}),
            error: Some(err.to_string()),
        },
    };

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        status,
    ))
}
