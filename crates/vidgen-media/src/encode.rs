//! Frame-sequence encoding orchestration.

use tokio::fs;
use tracing::{debug, info};
use vidgen_models::{GeneratorConfig, OutputFormat};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::frames::RunWorkspace;

/// Encoded video returned to the caller. The only artifact of a run
/// that survives the workspace cleanup.
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    format: OutputFormat,
    bytes: Vec<u8>,
}

impl EncodedVideo {
    pub(crate) fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// Container format of the encoded bytes.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encoded container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume, returning the encoded container bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode the workspace's frame files into a video, read the result
/// fully into memory, and remove the on-disk output.
///
/// The frame files and the transient output both live inside the run
/// workspace, so the caller's scoped cleanup reaps anything this
/// function leaves behind on a failure path.
pub async fn encode_frames(
    workspace: &RunWorkspace,
    frame_count: usize,
    config: &GeneratorConfig,
    runner: &FfmpegRunner,
) -> MediaResult<EncodedVideo> {
    let format = config.output_format;
    let output_path = workspace.output_path(format);

    let cmd = FfmpegCommand::frame_sequence(workspace.frame_pattern(), &output_path)
        .framerate(config.frame_rate)
        .output_args(config.encoding.to_ffmpeg_args(format));

    debug!(
        run_id = %workspace.run_id(),
        frame_count,
        frame_rate = config.frame_rate,
        format = %format,
        "encoding frame sequence"
    );

    runner.run(&cmd).await?;

    let bytes = fs::read(&output_path).await?;

    // The returned artifact is the in-memory buffer; the file itself
    // must not outlive the run.
    fs::remove_file(&output_path).await?;

    info!(
        run_id = %workspace.run_id(),
        frame_count,
        size_bytes = bytes.len(),
        format = %format,
        "video encoded"
    );

    Ok(EncodedVideo::new(format, bytes))
}
