pub mod cache;
pub mod config;
pub mod gemini;
pub mod pipeline;
pub mod server;
pub mod view;
