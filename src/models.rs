// API request/response data structures

use serde::{Deserialize, Serialize};

// Normalized Response Envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            code: 200,
            data: Some(data),
            message: "success".to_string(),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            data: None,
            message: message.into(),
        }
    }
}

// Request Types
#[derive(Debug, Clone, Deserialize)]
pub struct TextToImageRequest {
    pub text: String,
}

// Document Extraction Response
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub text: String,
    pub file_type: String,
    pub metadata: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Voice Transcription Response
#[derive(Debug, Clone, Serialize)]
pub struct VoiceResponse {
    pub success: bool,
    pub text: String,
    pub file_type: String,
    pub metadata: VoiceMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceMetadata {
    pub duration_seconds: f64,
    pub paragraphs_count: usize,
    pub paragraphs_info: Vec<ParagraphInfo>,
    pub word_count_total: usize,
    pub process_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphInfo {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub word_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_serialization() {
        let response = ApiResponse::ok(json!({"result": "generated code"}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["code"], 200);
        assert_eq!(value["data"]["result"], "generated code");
        assert_eq!(value["message"], "success");
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let response = ApiResponse::error(400, "No file provided");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["code"], 400);
        assert_eq!(value["message"], "No file provided");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_text_to_image_request_deserialization() {
        let request: TextToImageRequest =
            serde_json::from_str(r#"{"text":"a fox in snow"}"#).unwrap();
        assert_eq!(request.text, "a fox in snow");
    }

    #[test]
    fn test_extract_response_serialization() {
        let response = ExtractResponse {
            success: true,
            text: "hello".to_string(),
            file_type: "txt".to_string(),
            metadata: json!({"lines": 1}),
            error: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["text"], "hello");
        assert_eq!(value["metadata"]["lines"], 1);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_voice_response_serialization() {
        let response = VoiceResponse {
            success: true,
            text: "你好世界".to_string(),
            file_type: "mp3".to_string(),
            metadata: VoiceMetadata {
                duration_seconds: 2.5,
                paragraphs_count: 1,
                paragraphs_info: vec![ParagraphInfo {
                    text: "你好世界".to_string(),
                    start_time: 0.0,
                    end_time: 2.4,
                    word_count: 4,
                }],
                word_count_total: 4,
                process_time_seconds: 1.2,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["metadata"]["duration_seconds"], 2.5);
        assert_eq!(value["metadata"]["paragraphs_info"][0]["word_count"], 4);
        assert_eq!(value["metadata"]["word_count_total"], 4);
    }
}
