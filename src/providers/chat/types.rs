//! Request/response types for the chat completions endpoint

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::providers::core::error::ProviderError;

/// Image detail level passed to the vision model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    Low,
    High,
    Auto,
}

impl Detail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Detail::Low => "low",
            Detail::High => "high",
            Detail::Auto => "auto",
        }
    }

    /// Parse a detail level from its wire representation.
    pub fn parse(s: &str) -> Result<Self, ProviderError> {
        match s {
            "low" => Ok(Detail::Low),
            "high" => Ok(Detail::High),
            "auto" => Ok(Detail::Auto),
            other => Err(ProviderError::InvalidRequest(format!(
                "invalid detail level '{}', expected low, high or auto",
                other
            ))),
        }
    }
}

/// An image encoded as a `data:` URI, ready for a vision request
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data_uri: String,
    pub detail: Detail,
}

impl EncodedImage {
    /// Base64-encode raw image bytes with their MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: &str, detail: Detail) -> Self {
        let encoded = BASE64.encode(bytes);
        Self {
            data_uri: format!("data:{};base64,{}", mime_type, encoded),
            detail,
        }
    }
}

/// Chat completions request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A single chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_image(image: &EncodedImage) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![ContentPart::ImageUrl {
                image_url: ImageUrlSpec {
                    url: image.data_uri.clone(),
                    detail: Some(image.detail.as_str().to_string()),
                },
            }]),
        }
    }

}

/// Message content: plain text or multimodal parts
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrlSpec },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrlSpec {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Chat completions response body (only the fields we read)
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}
