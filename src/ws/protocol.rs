//! Client-facing WebSocket event types
//!
//! Events travel as JSON text frames with an `event` discriminator field.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events the browser client sends us
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    StartRecognition,
    AudioChunk {
        session_id: Uuid,
        /// Base64-encoded audio bytes
        audio_data: String,
    },
    EndRecognition {
        session_id: Uuid,
    },
}

/// Events we push back to the browser client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionEstablished {
        client_id: String,
        timestamp: f64,
    },
    SessionCreated {
        session_id: Uuid,
        timestamp: f64,
    },
    AudioReceived {
        status: String,
        timestamp: f64,
    },
    PartialResult {
        partial_text: String,
        full_text: String,
        sequence: i32,
        is_final: bool,
        timestamp: f64,
        session_id: Uuid,
    },
    SessionEnded {
        session_id: Uuid,
        timestamp: f64,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
        timestamp: f64,
    },
}

/// Current time as fractional unix seconds.
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
