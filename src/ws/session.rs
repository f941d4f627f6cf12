//! Per-session relay between a browser client and the streaming recognizer
//!
//! Each recognition session runs as its own task owning one upstream
//! WebSocket. The connection loop feeds it audio over a channel; results and
//! lifecycle events flow back over the shared outbound channel.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::providers::asr::{StreamAsrClient, StreamAsrConfig};
use crate::providers::core::error::ProviderError;

use super::protocol::{unix_timestamp, ServerEvent};

/// Commands the connection loop sends into a session task
#[derive(Debug)]
pub enum AudioCommand {
    Chunk(Vec<u8>),
    Finish,
}

/// Handle the connection loop keeps for a live session
pub struct SessionHandle {
    audio_tx: mpsc::UnboundedSender<AudioCommand>,
}

impl SessionHandle {
    /// Spawn a session task connected to the recognizer.
    pub fn spawn(
        config: StreamAsrConfig,
        session_id: Uuid,
        out: mpsc::UnboundedSender<ServerEvent>,
    ) -> Self {
        let (audio_tx, audio_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_session(config, session_id, audio_rx, out));
        Self { audio_tx }
    }

    pub fn send(&self, command: AudioCommand) -> bool {
        self.audio_tx.send(command).is_ok()
    }
}

async fn run_session(
    config: StreamAsrConfig,
    session_id: Uuid,
    mut commands: mpsc::UnboundedReceiver<AudioCommand>,
    out: mpsc::UnboundedSender<ServerEvent>,
) {
    let mut client = match StreamAsrClient::connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Recognizer connection failed");
            send_error(&out, "Failed to start recognition session", e);
            return;
        }
    };
    tracing::info!(session_id = %session_id, "Recognition session started");

    while let Some(command) = commands.recv().await {
        match command {
            AudioCommand::Chunk(audio) => match client.send_audio(&audio, false).await {
                Ok(delta) => {
                    if !delta.partial_text.is_empty() {
                        let _ = out.send(ServerEvent::PartialResult {
                            partial_text: delta.partial_text,
                            full_text: delta.full_text,
                            sequence: delta.sequence,
                            is_final: delta.is_final,
                            timestamp: unix_timestamp(),
                            session_id,
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "Recognition failed");
                    send_error(&out, "Recognition failed", e);
                    return;
                }
            },
            AudioCommand::Finish => {
                match client.finish().await {
                    Ok(delta) if !delta.partial_text.is_empty() => {
                        let _ = out.send(ServerEvent::PartialResult {
                            partial_text: delta.partial_text,
                            full_text: delta.full_text,
                            sequence: delta.sequence,
                            is_final: true,
                            timestamp: unix_timestamp(),
                            session_id,
                        });
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Finish failed");
                    }
                }
                break;
            }
        }
    }

    let _ = out.send(ServerEvent::SessionEnded {
        session_id,
        timestamp: unix_timestamp(),
    });
    tracing::info!(session_id = %session_id, "Recognition session ended");
}

fn send_error(out: &mpsc::UnboundedSender<ServerEvent>, message: &str, cause: ProviderError) {
    let _ = out.send(ServerEvent::Error {
        message: message.to_string(),
        details: Some(cause.to_string()),
        timestamp: unix_timestamp(),
    });
}
