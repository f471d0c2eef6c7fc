//! Output container formats.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container format for the encoded video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Avi,
    Mov,
}

impl OutputFormat {
    /// File extension for this container (no leading dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
        }
    }

    /// Default video codec for this container.
    ///
    /// MP4 and MOV carry H.264; AVI gets MPEG-4 Part 2 since H.264 in
    /// AVI is poorly supported by players.
    pub fn default_codec(&self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mov => "libx264",
            Self::Avi => "mpeg4",
        }
    }

    /// Parse from a lowercase format name or file extension.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Some(Self::Mp4),
            "avi" => Some(Self::Avi),
            "mov" => Some(Self::Mov),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(OutputFormat::Mp4.extension(), "mp4");
        assert_eq!(OutputFormat::Avi.extension(), "avi");
        assert_eq!(OutputFormat::Mov.extension(), "mov");
    }

    #[test]
    fn test_codec_mapping() {
        assert_eq!(OutputFormat::Mp4.default_codec(), "libx264");
        assert_eq!(OutputFormat::Mov.default_codec(), "libx264");
        assert_eq!(OutputFormat::Avi.default_codec(), "mpeg4");
    }

    #[test]
    fn test_parse() {
        assert_eq!(OutputFormat::parse("mp4"), Some(OutputFormat::Mp4));
        assert_eq!(OutputFormat::parse("MOV"), Some(OutputFormat::Mov));
        assert_eq!(OutputFormat::parse("mkv"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Avi).unwrap();
        assert_eq!(json, "\"avi\"");

        let format: OutputFormat = serde_json::from_str("\"mov\"").unwrap();
        assert_eq!(format, OutputFormat::Mov);
    }
}
