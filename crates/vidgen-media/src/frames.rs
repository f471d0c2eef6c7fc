//! Frame serialization and per-run temp workspace.
//!
//! The output tensor is sliced along its leading axis into per-frame
//! pixel buffers, which are persisted as sequentially named PNG files
//! inside a run-unique temp directory. The directory is the scoped
//! cleanup boundary for the whole run: dropping the workspace removes
//! every frame file and the transient encoder output.

use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbImage};
use ndarray::Array4;
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;
use vidgen_models::OutputFormat;

use crate::error::{MediaError, MediaResult};

/// Run-unique temp directory holding the frame files and the transient
/// encoder output for one `generate()` call.
///
/// Dropping the workspace removes the directory and everything in it;
/// [`RunWorkspace::close`] does the same but surfaces the error so the
/// caller can log cleanup failures.
#[derive(Debug)]
pub struct RunWorkspace {
    run_id: String,
    dir: TempDir,
}

impl RunWorkspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn create() -> MediaResult<Self> {
        let run_id = Uuid::new_v4().simple().to_string();
        let dir = tempfile::Builder::new()
            .prefix(&format!("vidgen-{run_id}-"))
            .tempdir()?;

        debug!(run_id = %run_id, dir = %dir.path().display(), "created run workspace");

        Ok(Self { run_id, dir })
    }

    /// Identifier of this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Directory path of this workspace.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the frame file at `index`.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("frame-{index}.png"))
    }

    /// FFmpeg image2 input pattern matching the frame files in
    /// increasing index order.
    pub fn frame_pattern(&self) -> PathBuf {
        self.dir.path().join("frame-%d.png")
    }

    /// Path of the transient encoder output for the given container.
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        self.dir
            .path()
            .join(format!("output.{}", format.extension()))
    }

    /// Remove the workspace, surfacing any filesystem error.
    pub fn close(self) -> MediaResult<()> {
        self.dir
            .close()
            .map_err(|e| MediaError::Cleanup(e.to_string()))
    }
}

/// Reconstruct one pixel buffer per leading-axis slice of the output
/// tensor, clamping each element into 0-255.
pub fn tensor_to_frames(tensor: &Array4<f32>) -> MediaResult<Vec<RgbImage>> {
    let (frame_count, height, width, _channels) = tensor.dim();

    let mut frames = Vec::with_capacity(frame_count);
    for slice in tensor.outer_iter() {
        let frame = RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let pixel = |c: usize| slice[[y as usize, x as usize, c]].clamp(0.0, 255.0) as u8;
            image::Rgb([pixel(0), pixel(1), pixel(2)])
        });
        frames.push(frame);
    }

    if frames.len() != frame_count {
        return Err(MediaError::FrameCountMismatch {
            expected: frame_count,
            actual: frames.len(),
        });
    }

    Ok(frames)
}

/// Write each frame as `frame-<i>.png` inside the workspace, in order,
/// so the encoder addresses frames purely by index.
pub fn persist_frames(workspace: &RunWorkspace, frames: &[RgbImage]) -> MediaResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(frames.len());

    for (index, frame) in frames.iter().enumerate() {
        let path = workspace.frame_path(index);
        frame
            .save_with_format(&path, ImageFormat::Png)
            .map_err(image_error)?;
        paths.push(path);
    }

    debug!(
        run_id = %workspace.run_id(),
        frame_count = paths.len(),
        "persisted frame files"
    );

    Ok(paths)
}

fn image_error(e: ImageError) -> MediaError {
    match e {
        ImageError::IoError(io) => MediaError::Io(io),
        other => MediaError::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn constant_tensor(frames: usize, value: f32) -> Array4<f32> {
        Array4::from_elem((frames, 8, 8, 3), value)
    }

    #[test]
    fn test_frame_count_matches_leading_dim() {
        let tensor = constant_tensor(5, 128.0);
        let frames = tensor_to_frames(&tensor).unwrap();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].dimensions(), (8, 8));
    }

    #[test]
    fn test_pixel_clamping() {
        let mut tensor = constant_tensor(1, 100.0);
        tensor[[0, 0, 0, 0]] = -42.0;
        tensor[[0, 0, 1, 1]] = 300.0;

        let frames = tensor_to_frames(&tensor).unwrap();
        assert_eq!(frames[0].get_pixel(0, 0)[0], 0);
        assert_eq!(frames[0].get_pixel(1, 0)[1], 255);
        assert_eq!(frames[0].get_pixel(2, 0)[2], 100);
    }

    #[test]
    fn test_persist_names_frames_by_index() {
        let workspace = RunWorkspace::create().unwrap();
        let tensor = constant_tensor(3, 10.0);
        let frames = tensor_to_frames(&tensor).unwrap();

        let paths = persist_frames(&workspace, &frames).unwrap();

        assert_eq!(paths.len(), 3);
        for (i, path) in paths.iter().enumerate() {
            assert!(path.exists());
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                format!("frame-{i}.png")
            );
        }
    }

    #[test]
    fn test_workspace_close_removes_frames() {
        let workspace = RunWorkspace::create().unwrap();
        let dir = workspace.path().to_path_buf();

        let tensor = constant_tensor(2, 10.0);
        let frames = tensor_to_frames(&tensor).unwrap();
        persist_frames(&workspace, &frames).unwrap();

        workspace.close().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_workspaces_are_disjoint() {
        let a = RunWorkspace::create().unwrap();
        let b = RunWorkspace::create().unwrap();
        assert_ne!(a.path(), b.path());
        assert_ne!(a.run_id(), b.run_id());
    }
}
