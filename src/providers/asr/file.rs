//! File-based speech recognition client
//!
//! The upstream task API is submit-then-poll: POST the whole audio file as
//! base64 to `submit`, then poll `query` with the same task id until the
//! status header reports completion. Status travels in the `X-Api-Status-Code`
//! response header rather than the body.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::providers::core::error::ProviderError;

use super::AudioFormat;

const STATUS_HEADER: &str = "X-Api-Status-Code";
const MESSAGE_HEADER: &str = "X-Api-Message";
const LOG_ID_HEADER: &str = "X-Tt-Logid";
const RESOURCE_ID: &str = "volc.bigasr.auc";

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLL_ATTEMPTS: u32 = 30;

/// How the upstream classified a task, from its status code header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskStatus {
    Done,
    Pending,
    Failed,
}

impl TaskStatus {
    fn classify(code: &str) -> Self {
        match code {
            "20000000" => TaskStatus::Done,
            "20000001" | "20000002" => TaskStatus::Pending,
            _ => TaskStatus::Failed,
        }
    }
}

/// A completed transcription with paragraph timing info
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub duration_seconds: f64,
    pub utterances: Vec<Utterance>,
}

/// One recognized paragraph, times in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub word_count: usize,
}

#[derive(Debug, Default, Deserialize)]
struct RawQueryResult {
    #[serde(default)]
    result: RawResult,
    #[serde(default)]
    audio_info: RawAudioInfo,
}

#[derive(Debug, Default, Deserialize)]
struct RawResult {
    #[serde(default)]
    text: String,
    #[serde(default)]
    utterances: Vec<RawUtterance>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUtterance {
    #[serde(default)]
    text: String,
    #[serde(default)]
    start_time: f64,
    #[serde(default)]
    end_time: f64,
    #[serde(default)]
    words: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAudioInfo {
    #[serde(default)]
    duration: f64,
}

impl Transcription {
    /// Convert a query response body, millisecond fields included, into the
    /// seconds-based public shape.
    fn from_raw(raw: RawQueryResult) -> Self {
        let utterances = raw
            .result
            .utterances
            .into_iter()
            .map(|u| Utterance {
                word_count: u.words.len(),
                text: u.text,
                start_time: u.start_time / 1000.0,
                end_time: u.end_time / 1000.0,
            })
            .collect();

        Self {
            text: raw.result.text,
            duration_seconds: raw.audio_info.duration / 1000.0,
            utterances,
        }
    }
}

/// Client for the submit/query speech recognition task API
pub struct AsrFileClient {
    http_client: Client,
    submit_url: String,
    query_url: String,
    app_id: String,
    token: String,
}

impl AsrFileClient {
    pub fn new(http_client: Client, base_url: &str, app_id: String, token: String) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            http_client,
            submit_url: format!("{}/submit", base),
            query_url: format!("{}/query", base),
            app_id,
            token,
        }
    }

    /// Transcribe a complete audio file: submit the task, then poll until the
    /// upstream reports it finished.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
    ) -> Result<Transcription, ProviderError> {
        let task_id = Uuid::new_v4().to_string();
        let log_id = self.submit(&task_id, audio, format).await?;
        tracing::info!(task_id = %task_id, log_id = %log_id, "Recognition task submitted");
        self.poll(&task_id, &log_id).await
    }

    async fn submit(
        &self,
        task_id: &str,
        audio: &[u8],
        format: AudioFormat,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "user": {"uid": self.app_id},
            "audio": {
                "format": format.as_str(),
                "data": BASE64.encode(audio),
            },
            "request": {
                "model_name": "bigmodel",
                "show_utterances": true,
                "corpus": {
                    "correct_table_name": "",
                    "context": "",
                },
            },
        });

        let response = self
            .http_client
            .post(&self.submit_url)
            .header("X-Api-App-Key", &self.app_id)
            .header("X-Api-Access-Key", &self.token)
            .header("X-Api-Resource-Id", RESOURCE_ID)
            .header("X-Api-Request-Id", task_id)
            .header("X-Api-Sequence", "-1")
            .json(&body)
            .send()
            .await?;

        let status = header_value(&response, STATUS_HEADER);
        if status != "20000000" {
            let message = header_value(&response, MESSAGE_HEADER);
            return Err(ProviderError::UpstreamError {
                code: status,
                message,
            });
        }

        Ok(header_value(&response, LOG_ID_HEADER))
    }

    async fn poll(&self, task_id: &str, log_id: &str) -> Result<Transcription, ProviderError> {
        for attempt in 0..MAX_POLL_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(POLL_INTERVAL).await;
            }

            let response = self
                .http_client
                .post(&self.query_url)
                .header("X-Api-App-Key", &self.app_id)
                .header("X-Api-Access-Key", &self.token)
                .header("X-Api-Resource-Id", RESOURCE_ID)
                .header("X-Api-Request-Id", task_id)
                .header(LOG_ID_HEADER, log_id)
                .json(&json!({ "task_id": task_id }))
                .send()
                .await?;

            let status = header_value(&response, STATUS_HEADER);
            match TaskStatus::classify(&status) {
                TaskStatus::Done => {
                    let raw: RawQueryResult = response.json().await?;
                    return Ok(Transcription::from_raw(raw));
                }
                TaskStatus::Pending => {
                    tracing::debug!(task_id = %task_id, attempt, "Recognition still running");
                }
                TaskStatus::Failed => {
                    let message = header_value(&response, MESSAGE_HEADER);
                    return Err(ProviderError::UpstreamError {
                        code: status,
                        message,
                    });
                }
            }
        }

        Err(ProviderError::Timeout {
            attempts: MAX_POLL_ATTEMPTS,
        })
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_classification() {
        assert_eq!(TaskStatus::classify("20000000"), TaskStatus::Done);
        assert_eq!(TaskStatus::classify("20000001"), TaskStatus::Pending);
        assert_eq!(TaskStatus::classify("20000002"), TaskStatus::Pending);
        assert_eq!(TaskStatus::classify("45000001"), TaskStatus::Failed);
        assert_eq!(TaskStatus::classify(""), TaskStatus::Failed);
    }

    #[test]
    fn test_endpoint_urls() {
        let client = AsrFileClient::new(
            Client::new(),
            "https://speech.example.com/api/v3/auc/bigmodel/",
            "app".to_string(),
            "token".to_string(),
        );
        assert_eq!(
            client.submit_url,
            "https://speech.example.com/api/v3/auc/bigmodel/submit"
        );
        assert_eq!(
            client.query_url,
            "https://speech.example.com/api/v3/auc/bigmodel/query"
        );
    }

    #[test]
    fn test_transcription_from_raw_converts_milliseconds() {
        let raw: RawQueryResult = serde_json::from_value(serde_json::json!({
            "result": {
                "text": "你好世界",
                "utterances": [
                    {
                        "text": "你好",
                        "start_time": 0,
                        "end_time": 1200,
                        "words": [{"text": "你"}, {"text": "好"}]
                    },
                    {
                        "text": "世界",
                        "start_time": 1500,
                        "end_time": 2400,
                        "words": [{"text": "世"}, {"text": "界"}]
                    }
                ]
            },
            "audio_info": {"duration": 2500}
        }))
        .unwrap();

        let transcription = Transcription::from_raw(raw);
        assert_eq!(transcription.text, "你好世界");
        assert_eq!(transcription.duration_seconds, 2.5);
        assert_eq!(transcription.utterances.len(), 2);
        assert_eq!(transcription.utterances[0].start_time, 0.0);
        assert_eq!(transcription.utterances[0].end_time, 1.2);
        assert_eq!(transcription.utterances[0].word_count, 2);
        assert_eq!(transcription.utterances[1].text, "世界");
    }

    #[test]
    fn test_transcription_from_sparse_body() {
        let raw: RawQueryResult = serde_json::from_value(serde_json::json!({})).unwrap();
        let transcription = Transcription::from_raw(raw);
        assert_eq!(transcription.text, "");
        assert_eq!(transcription.duration_seconds, 0.0);
        assert!(transcription.utterances.is_empty());
    }
}
