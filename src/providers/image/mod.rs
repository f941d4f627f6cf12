//! Image generation client (OpenAI-compatible) with file-server upload

pub mod client;
pub mod types;

pub use client::ImageClient;
