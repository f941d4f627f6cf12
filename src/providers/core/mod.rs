//! Core abstractions shared by provider clients

pub mod error;
