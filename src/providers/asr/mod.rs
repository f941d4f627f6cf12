//! ByteDance speech recognition clients
//!
//! Two upstream surfaces share credentials but not transport: the file-based
//! task API (`submit` + polled `query` over HTTP) and the streaming API (a
//! binary-framed WebSocket protocol). The wire codec for the latter lives in
//! [`wire`]; incremental transcript assembly lives in [`transcript`].

pub mod file;
pub mod stream;
pub mod transcript;
pub mod wire;

pub use file::{AsrFileClient, Transcription, Utterance};
pub use stream::{StreamAsrClient, StreamAsrConfig};
pub use transcript::{RecognitionDelta, TranscriptTracker};

/// Audio container formats accepted by the speech endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Pcm,
    Ogg,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm => "pcm",
            AudioFormat::Ogg => "ogg",
        }
    }
}

impl TryFrom<&str> for AudioFormat {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            "pcm" => Ok(Self::Pcm),
            "ogg" => Ok(Self::Ogg),
            other => Err(format!("Unsupported audio format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_roundtrip() {
        for name in ["mp3", "wav", "pcm", "ogg"] {
            let format = AudioFormat::try_from(name).unwrap();
            assert_eq!(format.as_str(), name);
        }
    }

    #[test]
    fn test_audio_format_case_insensitive() {
        assert_eq!(AudioFormat::try_from("WAV").unwrap(), AudioFormat::Wav);
    }

    #[test]
    fn test_audio_format_rejects_unknown() {
        let err = AudioFormat::try_from("flac").unwrap_err();
        assert!(err.contains("flac"));
    }
}
