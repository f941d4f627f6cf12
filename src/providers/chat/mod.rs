//! OpenAI-compatible chat/vision client

pub mod client;
pub mod prompts;
pub mod types;

pub use client::ChatClient;
pub use types::{Detail, EncodedImage};
