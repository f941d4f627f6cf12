//! Binary frame codec for the streaming ASR WebSocket protocol
//!
//! Every frame starts with a 4-byte header:
//!
//! ```text
//! byte 0: protocol_version (4 bits) | header_size in 4-byte words (4 bits)
//! byte 1: message_type (4 bits)     | message-type-specific flags (4 bits)
//! byte 2: serialization (4 bits)    | compression (4 bits)
//! byte 3: reserved
//! ```
//!
//! Client frames follow the header with an i32 big-endian sequence number, a
//! u32 big-endian payload size, and the gzip-compressed payload. The first
//! frame of a session carries the JSON session config; subsequent frames
//! carry raw audio. The final audio frame negates its sequence number and
//! sets the last-package flag bits.
//!
//! Server frames optionally carry a sequence (flag bit 0) and a last-package
//! marker (flag bit 1); the payload layout then depends on the message type.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::providers::core::error::ProviderError;

const PROTOCOL_VERSION: u8 = 0b0001;
const HEADER_WORDS: u8 = 0b0001;

const SERIAL_NONE: u8 = 0b0000;
const SERIAL_JSON: u8 = 0b0001;
const COMPRESS_NONE: u8 = 0b0000;
const COMPRESS_GZIP: u8 = 0b0001;

/// Sequence number present in the frame
pub const FLAG_POS_SEQUENCE: u8 = 0b0001;
/// Frame is the last package of the stream
pub const FLAG_LAST_PACKAGE: u8 = 0b0010;
/// Final client frame: negative sequence plus last-package marker
pub const FLAG_NEG_WITH_SEQUENCE: u8 = 0b0011;

/// Frame message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    FullClientRequest,
    AudioOnlyRequest,
    FullServerResponse,
    ServerAck,
    ServerErrorResponse,
}

impl MessageType {
    fn code(self) -> u8 {
        match self {
            MessageType::FullClientRequest => 0b0001,
            MessageType::AudioOnlyRequest => 0b0010,
            MessageType::FullServerResponse => 0b1001,
            MessageType::ServerAck => 0b1011,
            MessageType::ServerErrorResponse => 0b1111,
        }
    }

    fn from_code(code: u8) -> Result<Self, ProviderError> {
        match code {
            0b0001 => Ok(MessageType::FullClientRequest),
            0b0010 => Ok(MessageType::AudioOnlyRequest),
            0b1001 => Ok(MessageType::FullServerResponse),
            0b1011 => Ok(MessageType::ServerAck),
            0b1111 => Ok(MessageType::ServerErrorResponse),
            other => Err(ProviderError::WireError(format!(
                "unknown message type {:#06b}",
                other
            ))),
        }
    }
}

/// A decoded server frame
#[derive(Debug)]
pub struct ServerFrame {
    pub message_type: MessageType,
    /// Sequence number, when the frame carried one
    pub sequence: Option<i32>,
    /// True when the server marked this as the last package
    pub is_last: bool,
    /// Error code, on `ServerErrorResponse` frames
    pub error_code: Option<u32>,
    /// Decompressed, decoded payload
    pub payload: Option<serde_json::Value>,
}

fn header(message_type: MessageType, flags: u8) -> [u8; 4] {
    [
        (PROTOCOL_VERSION << 4) | HEADER_WORDS,
        (message_type.code() << 4) | flags,
        (SERIAL_JSON << 4) | COMPRESS_GZIP,
        0x00,
    ]
}

fn gzip(data: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| ProviderError::WireError(format!("gzip: {}", e)))
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ProviderError::WireError(format!("gunzip: {}", e)))?;
    Ok(out)
}

fn frame(
    message_type: MessageType,
    flags: u8,
    sequence: i32,
    payload: &[u8],
) -> Result<Vec<u8>, ProviderError> {
    let compressed = gzip(payload)?;
    let mut buf = Vec::with_capacity(12 + compressed.len());
    buf.extend_from_slice(&header(message_type, flags));
    buf.extend_from_slice(&sequence.to_be_bytes());
    buf.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    buf.extend_from_slice(&compressed);
    Ok(buf)
}

/// Encode the opening frame carrying the JSON session config.
pub fn full_client_request(
    sequence: i32,
    config: &serde_json::Value,
) -> Result<Vec<u8>, ProviderError> {
    let payload = serde_json::to_vec(config)?;
    frame(
        MessageType::FullClientRequest,
        FLAG_POS_SEQUENCE,
        sequence,
        &payload,
    )
}

/// Encode an audio frame. The caller passes the already-negated sequence for
/// the final frame.
pub fn audio_frame(sequence: i32, audio: &[u8], last: bool) -> Result<Vec<u8>, ProviderError> {
    let flags = if last {
        FLAG_NEG_WITH_SEQUENCE
    } else {
        FLAG_POS_SEQUENCE
    };
    frame(MessageType::AudioOnlyRequest, flags, sequence, audio)
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, ProviderError> {
    buf.get(offset..offset + 4)
        .map(|b| i32::from_be_bytes(b.try_into().expect("slice is 4 bytes")))
        .ok_or_else(|| ProviderError::WireError("frame truncated".to_string()))
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ProviderError> {
    buf.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes(b.try_into().expect("slice is 4 bytes")))
        .ok_or_else(|| ProviderError::WireError("frame truncated".to_string()))
}

/// Decode a server frame.
pub fn parse_server_frame(buf: &[u8]) -> Result<ServerFrame, ProviderError> {
    if buf.len() < 4 {
        return Err(ProviderError::WireError("frame shorter than header".to_string()));
    }

    let header_size = (buf[0] & 0x0f) as usize * 4;
    let message_type = MessageType::from_code(buf[1] >> 4)?;
    let flags = buf[1] & 0x0f;
    let serialization = buf[2] >> 4;
    let compression = buf[2] & 0x0f;

    if buf.len() < header_size {
        return Err(ProviderError::WireError("frame shorter than header".to_string()));
    }
    let mut payload = &buf[header_size..];

    let mut sequence = None;
    let is_last = flags & FLAG_LAST_PACKAGE != 0;

    if flags & FLAG_POS_SEQUENCE != 0 {
        sequence = Some(read_i32(payload, 0)?);
        payload = &payload[4..];
    }

    let mut error_code = None;
    let body: Option<&[u8]> = match message_type {
        MessageType::FullServerResponse => {
            let size = read_u32(payload, 0)? as usize;
            let body = payload
                .get(4..)
                .ok_or_else(|| ProviderError::WireError("frame truncated".to_string()))?;
            Some(&body[..size.min(body.len())])
        }
        MessageType::ServerAck => {
            sequence = Some(read_i32(payload, 0)?);
            if payload.len() >= 8 {
                let _size = read_u32(payload, 4)?;
                Some(&payload[8..])
            } else {
                None
            }
        }
        MessageType::ServerErrorResponse => {
            error_code = Some(read_u32(payload, 0)?);
            let _size = read_u32(payload, 4)?;
            Some(payload.get(8..).ok_or_else(|| {
                ProviderError::WireError("error frame truncated".to_string())
            })?)
        }
        MessageType::FullClientRequest | MessageType::AudioOnlyRequest => None,
    };

    let payload = match body {
        None => None,
        Some(raw) if raw.is_empty() => None,
        Some(raw) => {
            let inflated = if compression == COMPRESS_GZIP {
                gunzip(raw)?
            } else if compression == COMPRESS_NONE {
                raw.to_vec()
            } else {
                return Err(ProviderError::WireError(format!(
                    "unknown compression {:#06b}",
                    compression
                )));
            };

            match serialization {
                SERIAL_JSON => Some(serde_json::from_slice(&inflated).map_err(|e| {
                    ProviderError::WireError(format!("payload is not valid JSON: {}", e))
                })?),
                SERIAL_NONE => Some(serde_json::Value::String(
                    String::from_utf8_lossy(&inflated).into_owned(),
                )),
                other => {
                    return Err(ProviderError::WireError(format!(
                        "unknown serialization {:#06b}",
                        other
                    )))
                }
            }
        }
    };

    Ok(ServerFrame {
        message_type,
        sequence,
        is_last,
        error_code,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Build a server frame the way the upstream does, for parser tests.
    fn make_server_frame(
        message_type: MessageType,
        flags: u8,
        sequence: Option<i32>,
        body: &[u8],
    ) -> Vec<u8> {
        let mut buf = vec![
            (PROTOCOL_VERSION << 4) | HEADER_WORDS,
            (message_type.code() << 4) | flags,
            (SERIAL_JSON << 4) | COMPRESS_GZIP,
            0x00,
        ];
        if let Some(seq) = sequence {
            buf.extend_from_slice(&seq.to_be_bytes());
        }
        buf.extend_from_slice(body);
        buf
    }

    #[test]
    fn test_full_client_request_header() {
        let frame = full_client_request(1, &json!({"request": {}})).unwrap();
        assert_eq!(frame[0], 0x11); // version 1, header size 1
        assert_eq!(frame[1], 0x11); // full client request, positive sequence
        assert_eq!(frame[2], 0x11); // JSON, gzip
        assert_eq!(frame[3], 0x00);
        assert_eq!(i32::from_be_bytes(frame[4..8].try_into().unwrap()), 1);
        // payload size matches the remaining bytes
        let size = u32::from_be_bytes(frame[8..12].try_into().unwrap()) as usize;
        assert_eq!(size, frame.len() - 12);
    }

    #[test]
    fn test_audio_frame_flags() {
        let frame = audio_frame(2, b"pcm data", false).unwrap();
        assert_eq!(frame[1], 0x21); // audio-only, positive sequence

        let last = audio_frame(-3, b"", true).unwrap();
        assert_eq!(last[1], 0x23); // audio-only, negative sequence + last
        assert_eq!(i32::from_be_bytes(last[4..8].try_into().unwrap()), -3);
    }

    #[test]
    fn test_client_frame_payload_is_gzipped() {
        let frame = audio_frame(2, b"audio payload bytes", false).unwrap();
        let inflated = gunzip(&frame[12..]).unwrap();
        assert_eq!(inflated, b"audio payload bytes");
    }

    #[test]
    fn test_parse_full_server_response() {
        let payload = json!({
            "code": 1000,
            "result": {"text": "hello there"}
        });
        let compressed = gzip(&serde_json::to_vec(&payload).unwrap()).unwrap();
        let mut body = (compressed.len() as u32).to_be_bytes().to_vec();
        body.extend_from_slice(&compressed);
        let raw = make_server_frame(
            MessageType::FullServerResponse,
            FLAG_POS_SEQUENCE,
            Some(7),
            &body,
        );

        let frame = parse_server_frame(&raw).unwrap();
        assert_eq!(frame.message_type, MessageType::FullServerResponse);
        assert_eq!(frame.sequence, Some(7));
        assert!(!frame.is_last);
        let parsed = frame.payload.unwrap();
        assert_eq!(parsed["result"]["text"], "hello there");
    }

    #[test]
    fn test_parse_last_package_flag() {
        let payload = json!({"result": {"text": "done"}});
        let compressed = gzip(&serde_json::to_vec(&payload).unwrap()).unwrap();
        let mut body = (compressed.len() as u32).to_be_bytes().to_vec();
        body.extend_from_slice(&compressed);
        let raw = make_server_frame(
            MessageType::FullServerResponse,
            FLAG_POS_SEQUENCE | FLAG_LAST_PACKAGE,
            Some(-9),
            &body,
        );

        let frame = parse_server_frame(&raw).unwrap();
        assert!(frame.is_last);
        assert_eq!(frame.sequence, Some(-9));
    }

    #[test]
    fn test_parse_server_error_response() {
        let payload = json!({"message": "invalid audio format"});
        let compressed = gzip(&serde_json::to_vec(&payload).unwrap()).unwrap();
        let mut body = 45000001u32.to_be_bytes().to_vec();
        body.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        body.extend_from_slice(&compressed);
        let raw = make_server_frame(MessageType::ServerErrorResponse, 0, None, &body);

        let frame = parse_server_frame(&raw).unwrap();
        assert_eq!(frame.message_type, MessageType::ServerErrorResponse);
        assert_eq!(frame.error_code, Some(45000001));
        assert_eq!(frame.payload.unwrap()["message"], "invalid audio format");
    }

    #[test]
    fn test_parse_server_ack_without_payload() {
        let raw = make_server_frame(MessageType::ServerAck, 0, None, &5i32.to_be_bytes());
        let frame = parse_server_frame(&raw).unwrap();
        assert_eq!(frame.message_type, MessageType::ServerAck);
        assert_eq!(frame.sequence, Some(5));
        assert!(frame.payload.is_none());
    }

    #[test]
    fn test_parse_truncated_frame() {
        assert!(parse_server_frame(&[0x11, 0x91]).is_err());
        // header only, but full server response needs a size field
        assert!(parse_server_frame(&[0x11, 0x90, 0x11, 0x00]).is_err());
    }

    #[test]
    fn test_parse_unknown_message_type() {
        let raw = [0x11, 0x51, 0x11, 0x00, 0, 0, 0, 1];
        assert!(matches!(
            parse_server_frame(&raw),
            Err(ProviderError::WireError(_))
        ));
    }
}
