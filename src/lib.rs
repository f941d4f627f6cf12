// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod ws;

// Local document text extraction
pub mod extract;

// AI provider client layer
pub mod providers;

// Configuration and observability
pub mod config;
pub mod error;
pub mod logging;
