//! Image generation client implementation
//!
//! The textToImage flow is a three-step pipeline: ask the generation model
//! for an image URL, download the image, then re-upload the bytes to the
//! configured file server so callers get a durable file record instead of a
//! short-lived provider URL.

use std::time::Duration;

use chrono::Utc;
use reqwest::multipart;
use reqwest::Client;
use uuid::Uuid;

use crate::providers::core::error::ProviderError;

use super::types::{GenerateImageRequest, GenerateImageResponse, UploadResponse};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the images/generations endpoint plus the file-server upload leg
pub struct ImageClient {
    http_client: Client,
    endpoint_url: String,
    api_key: String,
    model: String,
    upload_url: String,
}

impl ImageClient {
    pub fn new(
        http_client: Client,
        base_url: &str,
        api_key: String,
        model: String,
        upload_url: String,
    ) -> Self {
        Self {
            http_client,
            endpoint_url: format!("{}/images/generations", base_url.trim_end_matches('/')),
            api_key,
            model,
            upload_url,
        }
    }

    /// Generate an image from a prompt and return the file server record for
    /// the uploaded result.
    pub async fn generate(&self, prompt: &str) -> Result<serde_json::Value, ProviderError> {
        let image_url = self.request_generation(prompt).await?;
        tracing::info!(url = %image_url, "Image generated");

        let image_bytes = self.download_image(&image_url).await?;
        tracing::info!(size = image_bytes.len(), "Image downloaded");

        self.upload_to_file_server(image_bytes).await
    }

    async fn request_generation(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateImageRequest::new(self.model.clone(), prompt);

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(ProviderError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateImageResponse = response.json().await?;
        parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| {
                ProviderError::UnexpectedResponse(
                    "image generation response had no URL".to_string(),
                )
            })
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .http_client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn upload_to_file_server(
        &self,
        image_bytes: Vec<u8>,
    ) -> Result<serde_json::Value, ProviderError> {
        if self.upload_url.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "no file server upload URL configured".to_string(),
            ));
        }

        let file_name = generated_file_name();
        tracing::info!(file_name = %file_name, "Uploading generated image");

        let file_part = multipart::Part::bytes(image_bytes)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| ProviderError::InvalidRequest(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("creator", "bayberry")
            .text("client", "pluginClient")
            .text("securityLevel", "normal")
            .text("encrypt", "false")
            .text("product", "plug");

        let response = self
            .http_client
            .post(&self.upload_url)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let parsed: UploadResponse = response.json().await?;
        parsed.data.ok_or_else(|| {
            ProviderError::UnexpectedResponse("file server response had no data".to_string())
        })
    }
}

/// Unique name for an uploaded generation: `output_{timestamp}_{8 hex}.png`.
fn generated_file_name() -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("output_{}_{}.png", stamp, &suffix[..8])
}
