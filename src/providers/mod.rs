//! Provider client layer
//!
//! Thin clients for the external AI services the gateway fronts: an
//! OpenAI-compatible chat/image API and the ByteDance speech services
//! (file-based task API and streaming WebSocket API).

pub mod asr;
pub mod chat;
pub mod core;
pub mod image;

// Re-export commonly used types
pub use self::core::error::ProviderError;
