//! FFmpeg command builder and runner for frame-sequence encoding.
//!
//! Commands are always spawned with a discrete argument vector, never a
//! shell-interpolated string, so externally influenced values (paths,
//! frame rate) cannot change the command structure.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Number of trailing stderr lines kept for diagnostics.
const STDERR_TAIL_LINES: usize = 40;

/// Builder for FFmpeg frame-sequence encoding commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Numbered frame input pattern (e.g. `/tmp/run/frame-%d.png`)
    input_pattern: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a command that encodes a numbered frame sequence.
    pub fn frame_sequence(input_pattern: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input_pattern: input_pattern.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the constant input frame rate.
    pub fn framerate(self, fps: u32) -> Self {
        self.input_arg("-framerate").input_arg(fps.to_string())
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set pixel format.
    pub fn pix_fmt(self, pix_fmt: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(pix_fmt)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        // Input args
        args.extend(self.input_args.clone());

        // Input pattern
        args.push("-i".to_string());
        args.push(self.input_pattern.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking, timeout and
/// cancellation.
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with a progress callback.
    ///
    /// On non-zero exit the error carries the exit code and the tail of
    /// the captured stderr output.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        progress_callback: F,
    ) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        // Check FFmpeg exists
        which::which("ffmpeg").map_err(|_| MediaError::EncoderNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("stderr not captured"))?;

        // Stderr carries both -progress key=value lines and diagnostic
        // output; split them and keep a tail of the diagnostics.
        let stderr_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut current = FfmpegProgress::default();
            let mut diagnostics: Vec<String> = Vec::new();

            while let Ok(Some(line)) = lines.next_line().await {
                match parse_progress_line(&line, &mut current) {
                    ParsedLine::Snapshot(progress) => progress_callback(progress),
                    ParsedLine::ProgressKey => {}
                    ParsedLine::Diagnostic => {
                        if diagnostics.len() == STDERR_TAIL_LINES {
                            diagnostics.remove(0);
                        }
                        diagnostics.push(line);
                    }
                }
            }

            diagnostics
        });

        let wait_result = self.wait_for_completion(&mut child).await;
        let diagnostics = stderr_handle.await.unwrap_or_default();

        let status = wait_result?;

        if status.success() {
            Ok(())
        } else {
            let stderr_tail = if diagnostics.is_empty() {
                None
            } else {
                Some(diagnostics.join("\n"))
            };
            Err(MediaError::encode_failed(
                "FFmpeg exited with non-zero status",
                stderr_tail,
                status.code(),
            ))
        }
    }

    /// Wait for the child process, honoring cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let cancel_rx = self.cancel_rx.clone();

        let wait_future = async {
            let Some(mut rx) = cancel_rx else {
                return Ok(child.wait().await?);
            };

            if *rx.borrow() {
                info!("FFmpeg cancelled before start, killing process");
                let _ = child.kill().await;
                return Err(MediaError::Cancelled);
            }

            loop {
                tokio::select! {
                    status = child.wait() => return Ok(status?),
                    changed = rx.changed() => match changed {
                        Ok(()) if *rx.borrow() => {
                            info!("FFmpeg cancelled, killing process");
                            let _ = child.kill().await;
                            return Err(MediaError::Cancelled);
                        }
                        Ok(()) => {}
                        // Sender dropped: no cancellation can arrive.
                        Err(_) => return Ok(child.wait().await?),
                    }
                }
            }
        };

        if let Some(timeout_secs) = self.timeout_secs {
            match tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), wait_future)
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "FFmpeg timed out after {} seconds, killing process",
                        timeout_secs
                    );
                    let _ = child.kill().await;
                    Err(MediaError::Timeout(timeout_secs))
                }
            }
        } else {
            wait_future.await
        }
    }
}

/// Outcome of parsing one stderr line.
enum ParsedLine {
    /// A `progress=` line completing one snapshot.
    Snapshot(FfmpegProgress),
    /// A recognized progress key that only updates state.
    ProgressKey,
    /// Anything else: diagnostic output.
    Diagnostic,
}

/// Parse a line from FFmpeg's `-progress pipe:2` output.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> ParsedLine {
    let line = line.trim();

    if line.is_empty() {
        return ParsedLine::ProgressKey;
    }

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys report microseconds in modern FFmpeg
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
                return ParsedLine::ProgressKey;
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
                return ParsedLine::ProgressKey;
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    current.fps = fps;
                }
                return ParsedLine::ProgressKey;
            }
            "speed" => {
                // Format: "1.5x" or "N/A"
                if value != "N/A" {
                    if let Some(speed_str) = value.strip_suffix('x') {
                        if let Ok(speed) = speed_str.trim().parse() {
                            current.speed = speed;
                        }
                    }
                }
                return ParsedLine::ProgressKey;
            }
            "progress" => {
                // "continue" or "end"
                if value == "end" {
                    current.is_complete = true;
                }
                return ParsedLine::Snapshot(current.clone());
            }
            // Remaining -progress keys (bitrate, total_size, dup_frames, ...)
            "bitrate" | "total_size" | "out_time" | "dup_frames" | "drop_frames" | "stream_0_0_q" => {
                return ParsedLine::ProgressKey;
            }
            _ => {}
        }
    }

    ParsedLine::Diagnostic
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::EncoderNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::frame_sequence("/tmp/run/frame-%d.png", "/tmp/run/output.mp4")
            .framerate(30)
            .video_codec("libx264")
            .preset("fast")
            .crf(18)
            .pix_fmt("yuv420p");

        let args = cmd.build_args();
        assert!(args.contains(&"-framerate".to_string()));
        assert!(args.contains(&"30".to_string()));
        assert!(args.contains(&"/tmp/run/frame-%d.png".to_string()));
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-pix_fmt".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/run/output.mp4");
    }

    #[test]
    fn test_framerate_precedes_input() {
        let cmd = FfmpegCommand::frame_sequence("frame-%d.png", "out.mp4").framerate(24);
        let args = cmd.build_args();

        let framerate_pos = args.iter().position(|a| a == "-framerate").unwrap();
        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(framerate_pos < input_pos);
    }

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        assert!(matches!(
            parse_progress_line("out_time_ms=5000000", &mut progress),
            ParsedLine::ProgressKey
        ));
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("frame=12", &mut progress);
        assert_eq!(progress.frame, 12);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let result = parse_progress_line("progress=end", &mut progress);
        assert!(matches!(result, ParsedLine::Snapshot(_)));
        assert!(progress.is_complete);
    }

    #[test]
    fn test_diagnostic_lines_detected() {
        let mut progress = FfmpegProgress::default();
        let result = parse_progress_line(
            "[image2 @ 0x5f] Could not open file: frame-0.png",
            &mut progress,
        );
        assert!(matches!(result, ParsedLine::Diagnostic));
    }
}
