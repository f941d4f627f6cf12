//! Error types for the provider layer

use thiserror::Error;

/// Errors that can occur when talking to an upstream AI service
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// The upstream rejected or failed the request with its own status code
    #[error("Upstream error ({code}): {message}")]
    UpstreamError { code: String, message: String },

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Binary frame encoding/decoding issues on the streaming ASR connection
    #[error("Wire protocol error: {0}")]
    WireError(String),

    /// WebSocket transport failures
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Invalid request parameters caught before dispatch
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream never finished within the polling budget
    #[error("Upstream timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// The upstream answered with a shape we cannot use
    #[error("Unexpected upstream response: {0}")]
    UnexpectedResponse(String),
}

// Implement conversion from common error types
impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ProviderError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ProviderError::HttpError {
                status: 0,
                body: err.to_string(),
            }
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ProviderError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ProviderError::WebSocketError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = ProviderError::HttpError {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_upstream_error_display() {
        let err = ProviderError::UpstreamError {
            code: "45000001".to_string(),
            message: "invalid audio".to_string(),
        };
        assert!(err.to_string().contains("45000001"));
        assert!(err.to_string().contains("invalid audio"));
    }

    #[test]
    fn test_timeout_display() {
        let err = ProviderError::Timeout { attempts: 30 };
        assert!(err.to_string().contains("30 attempts"));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ProviderError = json_err.into();
        assert!(matches!(err, ProviderError::SerializationError(_)));
    }
}
