//! CLI configuration from environment variables.

use std::path::PathBuf;

use vidgen_models::{EncodingConfig, GeneratorConfig, OutputFormat};

/// Default model artifact location
pub const DEFAULT_MODEL_PATH: &str = "models/generator.onnx";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Path to the ONNX model artifact
    pub model_path: PathBuf,
    /// Output frame rate
    pub frame_rate: u32,
    /// Output format override; when unset it is derived from the
    /// output file extension
    pub output_format: Option<OutputFormat>,
    /// Encoder subprocess timeout in seconds
    pub encode_timeout_secs: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            frame_rate: 30,
            output_format: None,
            encode_timeout_secs: None,
        }
    }
}

impl CliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            model_path: std::env::var("VIDGEN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH)),
            frame_rate: std::env::var("VIDGEN_FRAME_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            output_format: std::env::var("VIDGEN_OUTPUT_FORMAT")
                .ok()
                .and_then(|s| OutputFormat::parse(&s)),
            encode_timeout_secs: std::env::var("VIDGEN_ENCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Build the generator configuration, deriving the container format
    /// from the output file extension when no override is set.
    pub fn generator_config(&self, output_file: &std::path::Path) -> GeneratorConfig {
        let format = self
            .output_format
            .or_else(|| {
                output_file
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(OutputFormat::parse)
            })
            .unwrap_or_default();

        GeneratorConfig {
            model_path: self.model_path.clone(),
            frame_rate: self.frame_rate,
            output_format: format,
            encoding: EncodingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_format_derived_from_extension() {
        let config = CliConfig::default();
        let gen = config.generator_config(Path::new("out.mov"));
        assert_eq!(gen.output_format, OutputFormat::Mov);
    }

    #[test]
    fn test_format_override_wins() {
        let config = CliConfig {
            output_format: Some(OutputFormat::Avi),
            ..Default::default()
        };
        let gen = config.generator_config(Path::new("out.mp4"));
        assert_eq!(gen.output_format, OutputFormat::Avi);
    }

    #[test]
    fn test_unknown_extension_defaults_to_mp4() {
        let config = CliConfig::default();
        let gen = config.generator_config(Path::new("out.bin"));
        assert_eq!(gen.output_format, OutputFormat::Mp4);
    }
}
