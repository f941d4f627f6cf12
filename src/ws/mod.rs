//! Streaming voice recognition over WebSocket
//!
//! One connection can host several recognition sessions. The connection loop
//! decodes client events, routes audio into the matching session task, and
//! forwards everything the sessions emit back to the client as JSON text
//! frames.

pub mod protocol;
pub mod session;

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

use crate::state::SharedState;

use protocol::{unix_timestamp, ClientEvent, ServerEvent};
use session::{AudioCommand, SessionHandle};

/// Drive one client connection until it disconnects.
pub async fn client_connected(ws: WebSocket, state: SharedState) {
    let client_id = Uuid::new_v4();
    tracing::info!(client_id = %client_id, "WebSocket client connected");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Serialize outbound events onto the socket from a single task.
    let mut out_rx = UnboundedReceiverStream::new(out_rx);
    let forward = tokio::spawn(async move {
        while let Some(event) = out_rx.next().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };
            if ws_tx.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let _ = out_tx.send(ServerEvent::ConnectionEstablished {
        client_id: client_id.to_string(),
        timestamp: unix_timestamp(),
    });

    let mut sessions: HashMap<Uuid, SessionHandle> = HashMap::new();

    while let Some(result) = ws_rx.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(client_id = %client_id, error = %e, "WebSocket read failed");
                break;
            }
        };
        if message.is_close() {
            break;
        }
        let Ok(text) = message.to_str() else {
            continue;
        };

        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => handle_event(event, &state, &mut sessions, &out_tx),
            Err(e) => {
                let _ = out_tx.send(ServerEvent::Error {
                    message: "Unrecognized event".to_string(),
                    details: Some(e.to_string()),
                    timestamp: unix_timestamp(),
                });
            }
        }
    }

    // Dropping the handles closes each session's command channel; the
    // session tasks wind down on their own.
    drop(sessions);
    drop(out_tx);
    let _ = forward.await;
    tracing::info!(client_id = %client_id, "WebSocket client disconnected");
}

fn handle_event(
    event: ClientEvent,
    state: &SharedState,
    sessions: &mut HashMap<Uuid, SessionHandle>,
    out: &mpsc::UnboundedSender<ServerEvent>,
) {
    match event {
        ClientEvent::StartRecognition => {
            let session_id = Uuid::new_v4();
            let handle = SessionHandle::spawn(state.stream_asr_config(), session_id, out.clone());
            sessions.insert(session_id, handle);
            let _ = out.send(ServerEvent::SessionCreated {
                session_id,
                timestamp: unix_timestamp(),
            });
        }
        ClientEvent::AudioChunk {
            session_id,
            audio_data,
        } => {
            let audio = match BASE64.decode(audio_data.as_bytes()) {
                Ok(audio) if audio.is_empty() => {
                    let _ = out.send(ServerEvent::Error {
                        message: "Empty audio chunk".to_string(),
                        details: None,
                        timestamp: unix_timestamp(),
                    });
                    return;
                }
                Ok(audio) => audio,
                Err(e) => {
                    let _ = out.send(ServerEvent::Error {
                        message: "Invalid base64 audio data".to_string(),
                        details: Some(e.to_string()),
                        timestamp: unix_timestamp(),
                    });
                    return;
                }
            };

            match sessions.get(&session_id) {
                Some(handle) if handle.send(AudioCommand::Chunk(audio)) => {
                    let _ = out.send(ServerEvent::AudioReceived {
                        status: "received".to_string(),
                        timestamp: unix_timestamp(),
                    });
                }
                _ => {
                    let _ = out.send(ServerEvent::Error {
                        message: "Unknown session".to_string(),
                        details: Some(session_id.to_string()),
                        timestamp: unix_timestamp(),
                    });
                }
            }
        }
        ClientEvent::EndRecognition { session_id } => {
            match sessions.remove(&session_id) {
                Some(handle) => {
                    // The session task emits session_ended after the final
                    // transcript delta.
                    handle.send(AudioCommand::Finish);
                }
                None => {
                    let _ = out.send(ServerEvent::Error {
                        message: "Unknown session".to_string(),
                        details: Some(session_id.to_string()),
                        timestamp: unix_timestamp(),
                    });
                }
            }
        }
    }
}
