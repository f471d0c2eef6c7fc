//! Error types for the generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during video generation.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("model not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("failed to load model: {message}")]
    ModelLoad { message: String },

    #[error("model is not loaded; call initialize() first")]
    NotInitialized,

    #[error("no input images provided")]
    EmptyInput,

    #[error("failed to decode image {index}: {message}")]
    Decode { index: usize, message: String },

    #[error("inference failed: {message}")]
    Inference { message: String },

    #[error("frame count mismatch: tensor holds {expected} frames, produced {actual}")]
    FrameCountMismatch { expected: usize, actual: usize },

    #[error("FFmpeg not found in PATH")]
    EncoderNotFound,

    #[error("encoding failed: {message}")]
    EncodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("cleanup failed: {0}")]
    Cleanup(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a model load failure error.
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad {
            message: message.into(),
        }
    }

    /// Create a decode failure error for the image at `index`.
    pub fn decode(index: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: message.into(),
        }
    }

    /// Create an inference failure error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create an encode failure error.
    pub fn encode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EncodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<vidgen_models::ConfigError> for MediaError {
    fn from(e: vidgen_models::ConfigError) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}
