// Voice transcription handler: POST /api/v1/voiceToText

use std::time::Instant;

use bytes::Bytes;
use serde::Deserialize;
use warp::multipart::FormData;
use warp::{Rejection, Reply};

use crate::error::{reject, GatewayError};
use crate::models::{ParagraphInfo, VoiceMetadata, VoiceResponse};
use crate::providers::asr::AudioFormat;
use crate::state::SharedState;

use super::{read_form, take_field};

#[derive(Debug, Deserialize)]
pub struct VoiceQuery {
    pub format: Option<String>,
}

/// Multipart upload: audio format comes from the uploaded file's extension.
pub async fn voice_multipart_handler(
    state: SharedState,
    form: FormData,
) -> Result<impl Reply, Rejection> {
    let mut fields = read_form(form).await?;
    let file = take_field(&mut fields, "file")
        .ok_or_else(|| reject(GatewayError::BadRequest("No file provided".to_string())))?;

    let format = match file.extension() {
        Some(ext) => parse_format(&ext)?,
        None => AudioFormat::Mp3,
    };

    transcribe(state, file.bytes, format).await
}

/// Raw octet-stream upload: format comes from the `format` query parameter,
/// defaulting to mp3.
pub async fn voice_raw_handler(
    state: SharedState,
    query: VoiceQuery,
    body: Bytes,
) -> Result<impl Reply, Rejection> {
    let format = match query.format.as_deref() {
        Some(raw) => parse_format(raw)?,
        None => AudioFormat::Mp3,
    };

    transcribe(state, body.to_vec(), format).await
}

fn parse_format(raw: &str) -> Result<AudioFormat, Rejection> {
    AudioFormat::try_from(raw).map_err(|e| reject(GatewayError::BadRequest(e)))
}

async fn transcribe(
    state: SharedState,
    audio: Vec<u8>,
    format: AudioFormat,
) -> Result<impl Reply, Rejection> {
    if audio.is_empty() {
        return Err(reject(GatewayError::BadRequest(
            "Empty audio data".to_string(),
        )));
    }

    tracing::info!(format = format.as_str(), size = audio.len(), "Transcribing audio file");
    let started = Instant::now();

    let transcription = state
        .asr
        .transcribe(&audio, format)
        .await
        .map_err(reject)?;

    let paragraphs_info: Vec<ParagraphInfo> = transcription
        .utterances
        .iter()
        .map(|u| ParagraphInfo {
            text: u.text.clone(),
            start_time: u.start_time,
            end_time: u.end_time,
            word_count: u.word_count,
        })
        .collect();
    let word_count_total = paragraphs_info.iter().map(|p| p.word_count).sum();

    let response = VoiceResponse {
        success: true,
        text: transcription.text,
        file_type: format.as_str().to_string(),
        metadata: VoiceMetadata {
            duration_seconds: transcription.duration_seconds,
            paragraphs_count: paragraphs_info.len(),
            paragraphs_info,
            word_count_total,
            process_time_seconds: started.elapsed().as_secs_f64(),
        },
    };

    Ok(warp::reply::json(&response))
}
