//! Chat/vision client implementation

use reqwest::Client;

use crate::providers::core::error::ProviderError;

use super::prompts::{self, ImageCategory};
use super::types::{ChatMessage, ChatRequest, ChatResponse, EncodedImage};

/// Token budget for the classifier call: one category token is enough.
const CLASSIFY_MAX_TOKENS: u32 = 50;
/// Token budget for task execution and direct questions.
const TASK_MAX_TOKENS: u32 = 12_000;

/// Client for an OpenAI-compatible chat completions endpoint with vision
/// support
pub struct ChatClient {
    http_client: Client,
    endpoint_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new chat client.
    ///
    /// # Arguments
    ///
    /// * `http_client` - shared HTTP client
    /// * `base_url` - API base URL (e.g. `https://.../api/v3`)
    /// * `api_key` - bearer key
    /// * `model` - chat/vision model identifier
    pub fn new(http_client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            http_client,
            endpoint_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
        }
    }

    /// Answer a direct question about an image.
    pub async fn ask_about_image(
        &self,
        image: &EncodedImage,
        question: &str,
    ) -> Result<String, ProviderError> {
        let messages = vec![
            ChatMessage::user_image(image),
            ChatMessage::user_text(question),
        ];
        self.complete(messages, TASK_MAX_TOKENS).await
    }

    /// Run the two-stage pipeline: classify the image, then execute the task
    /// matching its category (UI-to-code, OCR, or description).
    pub async fn process_image(&self, image: &EncodedImage) -> Result<String, ProviderError> {
        let category = self.classify_image(image).await?;
        tracing::info!(category = category.as_str(), "Image classified");

        let messages = vec![
            ChatMessage::system(category.task_prompt()),
            ChatMessage::user_image(image),
        ];
        self.complete(messages, TASK_MAX_TOKENS).await
    }

    /// First stage: ask the model which category the image belongs to.
    async fn classify_image(&self, image: &EncodedImage) -> Result<ImageCategory, ProviderError> {
        let messages = vec![
            ChatMessage::system(prompts::CLASSIFY),
            ChatMessage::user_image(image),
        ];
        let output = self.complete(messages, CLASSIFY_MAX_TOKENS).await?;
        Ok(ImageCategory::from_model_output(&output))
    }

    /// Send a chat completions request and return the first choice's text.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(max_tokens),
        };

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

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::UnexpectedResponse("chat response had no content".to_string())
            })
    }
}
