//! ONNX Runtime model loading and frame synthesis.
//!
//! A [`VideoModel`] wraps one loaded ONNX session. Loading is not
//! idempotent: every `load` produces a fresh handle, and the generator
//! drops the prior handle when it re-initializes. The session is
//! serialized behind a mutex since ONNX Runtime execution takes the
//! session mutably.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::preprocess::FRAME_CHANNELS;

/// Handle to a loaded frame-synthesis model.
pub struct VideoModel {
    session: Mutex<Session>,
    output_name: String,
}

impl VideoModel {
    /// Load a model artifact from disk.
    ///
    /// Fails with [`MediaError::ModelNotFound`] when nothing exists at
    /// `path`, and with [`MediaError::ModelLoad`] when the artifact
    /// cannot be deserialized into a runnable session.
    pub fn load(path: &Path) -> MediaResult<Self> {
        if !path.exists() {
            return Err(MediaError::ModelNotFound(path.to_path_buf()));
        }

        let model_bytes = std::fs::read(path)
            .map_err(|e| MediaError::model_load(format!("read model file: {e}")))?;

        let session = Session::builder()
            .map_err(|e| MediaError::model_load(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| MediaError::model_load(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| MediaError::model_load(format!("ORT load model: {e}")))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| MediaError::model_load("model declares no outputs"))?;

        info!(path = %path.display(), output = %output_name, "model loaded");

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }

    /// Run the model over an `[N, H, W, 3]` batch and return the
    /// synthesized `[F, H, W, 3]` frame tensor.
    ///
    /// The input batch is consumed, and the runtime's raw outputs are
    /// copied into an owned array and released before returning, so no
    /// intermediate tensor outlives the call.
    pub fn infer(&self, batch: Array4<f32>) -> MediaResult<Array4<f32>> {
        let (n, h, w, c) = batch.dim();
        debug!(batch_size = n, "running inference");

        let shape = vec![n, h, w, c];
        let input: Value = Tensor::from_array((shape, batch.into_raw_vec().into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| MediaError::inference(format!("ORT input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::inference("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::inference(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| MediaError::inference("ORT returned no outputs"))?;

        let (out_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::inference(format!("ORT extract: {e}")))?;

        if out_shape.len() != 4 || out_shape[3] as usize != FRAME_CHANNELS {
            return Err(MediaError::inference(format!(
                "unexpected output shape {out_shape:?}, expected [frames, h, w, 3]"
            )));
        }

        let dims = (
            out_shape[0] as usize,
            out_shape[1] as usize,
            out_shape[2] as usize,
            out_shape[3] as usize,
        );

        // Copy out of the runtime-owned buffer; `outputs` is dropped at
        // the end of this call, releasing the raw output tensor.
        let frames = Array4::from_shape_vec(dims, data.to_vec())
            .map_err(|e| MediaError::inference(format!("output tensor layout: {e}")))?;

        debug!(frame_count = dims.0, "inference complete");

        Ok(frames)
    }
}

impl std::fmt::Debug for VideoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoModel")
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model() {
        let result = VideoModel::load(Path::new("/nonexistent/model.onnx"));
        assert!(matches!(result, Err(MediaError::ModelNotFound(_))));
    }

    #[test]
    fn test_load_invalid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let result = VideoModel::load(&path);
        assert!(matches!(result, Err(MediaError::ModelLoad { .. })));
    }
}
