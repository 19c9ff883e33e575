// Module declarations
pub mod chat;
pub mod client;
pub mod config;
pub mod models;
pub mod parsers;
pub mod render;

// Re-export models for use at the crate root
pub use models::*;
