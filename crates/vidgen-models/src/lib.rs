//! Shared data models for the vidgen pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Generator configuration (model path, frame rate, output format)
//! - Output container formats
//! - Encoding configuration

pub mod config;
pub mod encoding;
pub mod format;

// Re-export common types
pub use config::{ConfigError, GeneratorConfig, MAX_FRAME_RATE};
pub use encoding::EncodingConfig;
pub use format::OutputFormat;
