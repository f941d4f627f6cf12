//! Incremental transcript assembly for streaming recognition
//!
//! The streaming recognizer re-sends the full utterance-so-far on every
//! response. [`TranscriptTracker`] diffs each payload against the previous
//! one and surfaces only the newly recognized words, so callers can emit
//! incremental updates instead of repeating the whole sentence.

use serde_json::Value;

/// What a single server payload contributed to the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionDelta {
    /// Words recognized since the last payload, joined together. Empty when
    /// the payload added nothing new.
    pub partial_text: String,
    /// The complete transcript accumulated so far
    pub full_text: String,
    /// Frame sequence the payload arrived with
    pub sequence: i32,
    /// True when the server marked the stream complete
    pub is_final: bool,
}

/// Tracks recognition state across streaming responses
#[derive(Debug, Default)]
pub struct TranscriptTracker {
    last_sequence: i32,
    last_words: Vec<String>,
    accumulated: String,
}

impl TranscriptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The complete transcript observed so far.
    pub fn full_text(&self) -> &str {
        &self.accumulated
    }

    /// Fold one server payload into the transcript and report what changed.
    ///
    /// Stale frames (sequence at or below the last seen) and payloads without
    /// recognized text produce an empty `partial_text`.
    pub fn observe(
        &mut self,
        payload: Option<&Value>,
        frame_sequence: i32,
        is_final: bool,
    ) -> RecognitionDelta {
        let mut partial = String::new();

        if let Some(result) = payload.and_then(|p| p.get("result")) {
            let current_text = result
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default();

            if !current_text.is_empty() && frame_sequence > self.last_sequence {
                let current_words = extract_words(result, current_text);
                let new_words: Vec<&String> = current_words
                    .iter()
                    .filter(|word| !self.last_words.contains(word))
                    .collect();

                if !new_words.is_empty() {
                    partial = new_words
                        .iter()
                        .map(|word| word.as_str())
                        .collect::<Vec<_>>()
                        .join("");
                    self.accumulated = current_text.to_string();
                    self.last_words = current_words;
                }
            }
        }

        if frame_sequence > self.last_sequence {
            self.last_sequence = frame_sequence;
        }

        RecognitionDelta {
            partial_text: partial,
            full_text: self.accumulated.clone(),
            sequence: frame_sequence,
            is_final,
        }
    }
}

/// Pull the word list out of a result payload, falling back to splitting the
/// text when the server sent no word timing info.
fn extract_words(result: &Value, text: &str) -> Vec<String> {
    let from_utterances: Vec<String> = result
        .get("utterances")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|utterance| utterance.get("words").and_then(Value::as_array))
        .flatten()
        .filter_map(|word| word.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    if from_utterances.is_empty() {
        text.split_whitespace().map(str::to_string).collect()
    } else {
        from_utterances
    }
}
