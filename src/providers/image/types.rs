//! Request/response types for image generation

use serde::{Deserialize, Serialize};

/// Images/generations request body
#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub response_format: String,
}

impl GenerateImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            size: "1024x1024".to_string(),
            response_format: "url".to_string(),
        }
    }
}

/// Images/generations response body (only the fields we read)
#[derive(Debug, Deserialize)]
pub struct GenerateImageResponse {
    pub data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
}

/// File server upload response envelope
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub data: Option<serde_json::Value>,
}
