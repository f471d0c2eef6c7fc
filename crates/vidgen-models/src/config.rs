//! Generator configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::EncodingConfig;
use crate::format::OutputFormat;

/// Default output frame rate
pub const DEFAULT_FRAME_RATE: u32 = 30;
/// Upper bound on the configurable frame rate
pub const MAX_FRAME_RATE: u32 = 60;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("model path must not be empty")]
    EmptyModelPath,

    #[error("frame rate must be between 1 and {MAX_FRAME_RATE}, got {0}")]
    InvalidFrameRate(u32),
}

/// Configuration for one video generator instance.
///
/// Immutable for the lifetime of the generator that was built from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Path to the serialized inference model (ONNX).
    pub model_path: PathBuf,

    /// Output frame rate (frames per second, 1-60).
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Output container format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Encoding parameters.
    #[serde(default)]
    pub encoding: EncodingConfig,
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl GeneratorConfig {
    /// Create a configuration with defaults for everything but the model path.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            frame_rate: DEFAULT_FRAME_RATE,
            output_format: OutputFormat::default(),
            encoding: EncodingConfig::default(),
        }
    }

    /// Returns a new config with the given frame rate.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Returns a new config with the given output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyModelPath);
        }
        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::new("/models/m1");
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.output_format, OutputFormat::Mp4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_rate_bounds() {
        let config = GeneratorConfig::new("/models/m1").with_frame_rate(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrameRate(0)));

        let config = GeneratorConfig::new("/models/m1").with_frame_rate(61);
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrameRate(61)));

        let config = GeneratorConfig::new("/models/m1").with_frame_rate(60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_model_path() {
        let config = GeneratorConfig::new("");
        assert_eq!(config.validate(), Err(ConfigError::EmptyModelPath));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"model_path": "/models/m1", "output_format": "mov"}"#)
                .unwrap();
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.output_format, OutputFormat::Mov);
        assert_eq!(config.encoding.crf, 18);
    }
}
