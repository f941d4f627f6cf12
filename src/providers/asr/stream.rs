//! Streaming speech recognition client
//!
//! Holds a WebSocket to the streaming recognizer and relays audio chunks as
//! binary frames (see [`super::wire`]). Each response payload is folded into
//! a [`super::TranscriptTracker`] so callers receive incremental deltas.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::providers::core::error::ProviderError;

use super::transcript::{RecognitionDelta, TranscriptTracker};
use super::wire;

const RESOURCE_ID: &str = "volc.bigasr.sauc.duration";
const SUCCESS_CODE: i64 = 1000;

/// Connection parameters for a streaming recognition session
#[derive(Debug, Clone)]
pub struct StreamAsrConfig {
    pub ws_url: String,
    pub app_id: String,
    pub token: String,
    pub uid: String,
    pub format: String,
    pub sample_rate: u32,
    pub bits: u32,
    pub channel: u32,
}

impl StreamAsrConfig {
    pub fn new(ws_url: String, app_id: String, token: String) -> Self {
        Self {
            ws_url,
            app_id,
            token,
            uid: "test_user".to_string(),
            format: "pcm".to_string(),
            sample_rate: 16000,
            bits: 16,
            channel: 1,
        }
    }

    /// Session config sent in the opening frame.
    fn session_request(&self) -> serde_json::Value {
        json!({
            "user": {"uid": self.uid},
            "audio": {
                "format": self.format,
                "sample_rate": self.sample_rate,
                "bits": self.bits,
                "channel": self.channel,
                "codec": "raw",
            },
            "request": {
                "model_name": "bigmodel",
                "enable_punc": true,
                "enable_itn": true,
                "enable_timestamp": true,
                "enable_vad": true,
                "vad_pause_time": 500,
                "vad_max_duration": 60000,
                "vad_max_sentence_silence": 800,
            },
        })
    }
}

/// One live streaming recognition session
pub struct StreamAsrClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    sequence: i32,
    tracker: TranscriptTracker,
}

impl StreamAsrClient {
    /// Open a session: connect, send the config frame, and wait for the
    /// server to accept it.
    pub async fn connect(config: &StreamAsrConfig) -> Result<Self, ProviderError> {
        let request_id = Uuid::new_v4().to_string();

        let mut request = config
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| ProviderError::WebSocketError(e.to_string()))?;
        let headers = request.headers_mut();
        headers.insert("X-Api-Resource-Id", header(RESOURCE_ID)?);
        headers.insert("X-Api-Access-Key", header(&config.token)?);
        headers.insert("X-Api-App-Key", header(&config.app_id)?);
        headers.insert("X-Api-Request-Id", header(&request_id)?);
        headers.insert("X-Api-Connect-Id", header(&request_id)?);

        let (mut ws, _) = connect_async(request).await?;

        let opening = wire::full_client_request(1, &config.session_request())?;
        ws.send(Message::Binary(opening)).await?;

        let frame = recv_frame(&mut ws).await?;
        if let Some(code) = frame
            .payload
            .as_ref()
            .and_then(|p| p.get("code"))
            .and_then(serde_json::Value::as_i64)
        {
            if code != SUCCESS_CODE {
                let message = frame
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("message"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("session rejected")
                    .to_string();
                return Err(ProviderError::UpstreamError {
                    code: code.to_string(),
                    message,
                });
            }
        }
        tracing::debug!(request_id = %request_id, "Streaming recognition session opened");

        Ok(Self {
            ws,
            sequence: 1,
            tracker: TranscriptTracker::new(),
        })
    }

    /// Send one audio chunk and fold the server's reply into the transcript.
    pub async fn send_audio(
        &mut self,
        chunk: &[u8],
        last: bool,
    ) -> Result<RecognitionDelta, ProviderError> {
        self.sequence += 1;
        let seq = if last { -self.sequence } else { self.sequence };

        let frame = wire::audio_frame(seq, chunk, last)?;
        self.ws.send(Message::Binary(frame)).await?;

        let reply = recv_frame(&mut self.ws).await?;
        if let Some(code) = reply.error_code {
            let message = reply
                .payload
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_default();
            return Err(ProviderError::UpstreamError {
                code: code.to_string(),
                message,
            });
        }

        let sequence = reply.sequence.map(i32::abs).unwrap_or(self.sequence);
        Ok(self
            .tracker
            .observe(reply.payload.as_ref(), sequence, reply.is_last))
    }

    /// Signal end of audio and close the connection, returning the final
    /// transcript delta.
    pub async fn finish(&mut self) -> Result<RecognitionDelta, ProviderError> {
        let delta = self.send_audio(&[], true).await?;
        let _ = self.ws.close(None).await;
        Ok(delta)
    }

    /// The complete transcript observed so far.
    pub fn full_text(&self) -> &str {
        self.tracker.full_text()
    }
}

fn header(
    value: &str,
) -> Result<tokio_tungstenite::tungstenite::http::HeaderValue, ProviderError> {
    value
        .parse()
        .map_err(|_| ProviderError::WebSocketError(format!("invalid header value: {}", value)))
}

/// Read the next data frame, skipping protocol pings.
async fn recv_frame(
    ws: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
) -> Result<wire::ServerFrame, ProviderError> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Binary(data))) => return wire::parse_server_frame(&data),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => {
                return Err(ProviderError::WebSocketError(
                    "connection closed by recognizer".to_string(),
                ))
            }
            Some(Ok(other)) => {
                return Err(ProviderError::WebSocketError(format!(
                    "unexpected frame: {:?}",
                    other
                )))
            }
            Some(Err(e)) => return Err(e.into()),
        }
    }
}
