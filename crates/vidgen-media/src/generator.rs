//! Video generator facade.
//!
//! Composes the pipeline stages into a two-call contract:
//! `initialize()` loads the model, `generate(images)` runs
//! preprocess -> inference -> frame serialization -> encoding. The
//! first stage to fail aborts all later stages; the run workspace is
//! closed on every exit path before the error is surfaced, and the
//! generator remains usable for retry.

use tokio::sync::watch;
use tracing::{info, warn};
use vidgen_models::GeneratorConfig;

use crate::command::FfmpegRunner;
use crate::encode::{encode_frames, EncodedVideo};
use crate::error::{MediaError, MediaResult};
use crate::frames::{persist_frames, tensor_to_frames, RunWorkspace};
use crate::model::VideoModel;
use crate::preprocess::batch_images;

/// Model handle state. Inference is only reachable through the
/// `Initialized` variant, so the guard cannot be forgotten at a call
/// site.
#[derive(Debug)]
enum ModelState {
    Uninitialized,
    Initialized(VideoModel),
}

/// Image-to-video generator.
///
/// One instance owns at most one model handle. `initialize()` replaces
/// (and drops) any previously held handle; `generate()` may be called
/// repeatedly, and concurrent calls are safe because every run gets a
/// disjoint temp workspace and the model session is internally
/// serialized.
#[derive(Debug)]
pub struct VideoGenerator {
    config: GeneratorConfig,
    state: ModelState,
    encode_timeout_secs: Option<u64>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl VideoGenerator {
    /// Create a generator from a validated configuration.
    pub fn new(config: GeneratorConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ModelState::Uninitialized,
            encode_timeout_secs: None,
            cancel_rx: None,
        })
    }

    /// Set a timeout for the encoder subprocess.
    pub fn with_encode_timeout(mut self, secs: u64) -> Self {
        self.encode_timeout_secs = Some(secs);
        self
    }

    /// Set a cancellation signal observed during encoding. A cancelled
    /// run still reaps its temp files.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Configuration this generator was built from.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Whether a model is currently loaded.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, ModelState::Initialized(_))
    }

    /// Load the model at the configured path.
    ///
    /// On success any previously held handle is replaced and dropped.
    /// On failure the prior state is kept, so a generator that was
    /// never initialized stays uninitialized.
    pub async fn initialize(&mut self) -> MediaResult<()> {
        let model = VideoModel::load(&self.config.model_path)?;
        self.state = ModelState::Initialized(model);
        Ok(())
    }

    /// Generate an encoded video from an ordered sequence of raw image
    /// buffers. Frame `i` of the batch derives from `images[i]`.
    pub async fn generate(&self, images: &[Vec<u8>]) -> MediaResult<EncodedVideo> {
        let model = match &self.state {
            ModelState::Initialized(model) => model,
            ModelState::Uninitialized => return Err(MediaError::NotInitialized),
        };

        if images.is_empty() {
            return Err(MediaError::EmptyInput);
        }

        let batch = batch_images(images)?;
        let output = model.infer(batch)?;
        let frames = tensor_to_frames(&output)?;
        // Frame data is extracted; release the output tensor before the
        // I/O stages.
        drop(output);

        let workspace = RunWorkspace::create()?;
        info!(
            run_id = %workspace.run_id(),
            images = images.len(),
            frames = frames.len(),
            "starting encode run"
        );

        let result = self.encode_run(&workspace, &frames).await;

        // Scoped cleanup on every path. A cleanup failure is secondary:
        // logged, never masking the run's own result.
        if let Err(e) = workspace.close() {
            warn!(error = %e, "temp frame cleanup failed");
        }

        result
    }

    async fn encode_run(
        &self,
        workspace: &RunWorkspace,
        frames: &[image::RgbImage],
    ) -> MediaResult<EncodedVideo> {
        let paths = persist_frames(workspace, frames)?;

        let mut runner = FfmpegRunner::new();
        if let Some(secs) = self.encode_timeout_secs {
            runner = runner.with_timeout(secs);
        }
        if let Some(rx) = &self.cancel_rx {
            runner = runner.with_cancel(rx.clone());
        }

        encode_frames(workspace, paths.len(), &self.config, &runner).await
    }
}
