#![deny(unreachable_patterns)]
//! Image-to-video generation pipeline.
//!
//! This crate provides:
//! - ONNX model loading and frame synthesis via ONNX Runtime
//! - Parallel image decoding and batch tensor assembly
//! - Frame serialization into run-unique temp workspaces
//! - Type-safe FFmpeg command building with progress parsing
//! - A two-call facade: `initialize()` then `generate(images)`
//!
//! Temp artifacts of a run never outlive `generate()`, on either the
//! success or the failure path.

pub mod command;
pub mod encode;
pub mod error;
pub mod frames;
pub mod generator;
pub mod model;
pub mod preprocess;
pub mod progress;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use encode::{encode_frames, EncodedVideo};
pub use error::{MediaError, MediaResult};
pub use frames::{persist_frames, tensor_to_frames, RunWorkspace};
pub use generator::VideoGenerator;
pub use model::VideoModel;
pub use preprocess::{batch_images, FRAME_CHANNELS, FRAME_SIZE};
pub use progress::{FfmpegProgress, ProgressCallback};
