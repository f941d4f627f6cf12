//! Environment-driven gateway configuration

use std::net::IpAddr;

use thiserror::Error;

/// Default body size limit (16 MiB), matching the upload cap the gateway
/// advertises to clients.
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 16 * 1024 * 1024;

const DEFAULT_DOUBAO_BASE_URL: &str = "https://openspeech.bytedance.com/api/v3/auc/bigmodel";
const DEFAULT_DOUBAO_STREAM_URL: &str = "wss://openspeech.bytedance.com/api/v3/sauc/bigmodel";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    /// A value is present but unusable
    #[error("Invalid configuration for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Gateway settings, sourced from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI-compatible API base URL (chat + image generation)
    pub base_url: String,
    /// Bearer key for the OpenAI-compatible API
    pub api_key: String,
    /// Chat/vision model identifier
    pub model_name: String,
    /// Image generation model identifier
    pub image_model_name: String,

    /// ByteDance speech app id
    pub doubao_app_id: String,
    /// ByteDance speech access token
    pub doubao_token: String,
    /// File-based ASR base URL (submit/query)
    pub doubao_base_url: String,
    /// Streaming ASR WebSocket URL
    pub doubao_stream_base_url: String,

    /// File server endpoint for generated image uploads
    pub fileserver_upload_url: String,

    /// Bind address
    pub api_host: IpAddr,
    /// Bind port
    pub api_port: u16,
    /// Maximum accepted request body size in bytes
    pub max_content_length: u64,
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let api_host: IpAddr = optional("API_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "API_HOST",
                reason: format!("{}", e),
            })?;

        let api_port: u16 = optional("API_PORT", "8080")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "API_PORT",
                reason: format!("{}", e),
            })?;

        let max_content_length: u64 = optional(
            "MAX_CONTENT_LENGTH",
            &DEFAULT_MAX_CONTENT_LENGTH.to_string(),
        )
        .parse()
        .map_err(|e| ConfigError::Invalid {
            name: "MAX_CONTENT_LENGTH",
            reason: format!("{}", e),
        })?;

        let settings = Self {
            base_url: required("BASE_URL")?,
            api_key: required("API_KEY")?,
            model_name: required("MODEL_NAME")?,
            image_model_name: optional("IMAGE_MODEL_NAME", ""),
            doubao_app_id: optional("DOUBAO_APP_ID", ""),
            doubao_token: optional("DOUBAO_TOKEN", ""),
            doubao_base_url: optional("DOUBAO_BASE_URL", DEFAULT_DOUBAO_BASE_URL),
            doubao_stream_base_url: optional("DOUBAO_STREAM_BASE_URL", DEFAULT_DOUBAO_STREAM_URL),
            fileserver_upload_url: optional("FILESERVER_UPLOAD_URL", ""),
            api_host,
            api_port,
            max_content_length,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field constraints.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "BASE_URL",
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if self.api_port == 0 {
            return Err(ConfigError::Invalid {
                name: "API_PORT",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Join an endpoint path onto the OpenAI-compatible base URL.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}
