//! Cartoonization engine: preprocess, inference, postprocess as one unit.
//!
//! The engine owns the loaded generator session plus the model constants
//! (target resolution and both normalization pairs) and exposes a single
//! [`Stylize::stylize`] operation that runs the full image-to-image
//! pipeline. Everything else in the crate treats the generator as opaque:
//! floats go in, floats come out.

pub(crate) mod session;

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::ModelConfig;
use crate::error::PipelineError;
use crate::pipeline::orientation::Orientation;
use crate::pipeline::postprocess::postprocess_rgb;
use crate::pipeline::preprocess::preprocess;

use self::session::CartoonSession;

/// The one operation the worker needs from an engine. A seam for tests,
/// which substitute a fake that never touches ONNX Runtime.
pub trait Stylize: Send + Sync + 'static {
    /// Run the full pipeline on one decoded photo.
    ///
    /// `original_size`, when given, rescales the result back toward the
    /// source photo's aspect after denormalization.
    fn stylize(
        &self,
        image: &DynamicImage,
        orientation: Orientation,
        original_size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, PipelineError>;
}

/// Engine for cartoonizing photos via an ONNX generator.
pub struct CartoonEngine {
    session: CartoonSession,
    model: ModelConfig,
}

impl CartoonEngine {
    /// Load the generator from the model directory.
    ///
    /// The file name and extension come from configuration:
    /// `{model_dir}/{name}.{extension}`.
    pub fn load(model: &ModelConfig, model_dir: &Path) -> Result<Self, PipelineError> {
        let model_path = Self::model_path(model, model_dir);

        if !model_path.exists() {
            return Err(PipelineError::Allocation {
                path: model_path,
                message: "Model not found. Place the generator file in the model directory."
                    .to_string(),
            });
        }

        tracing::info!("Loading generator from {:?}", model_path);
        let session = CartoonSession::load(&model_path)?;
        tracing::info!("Generator loaded successfully");

        Ok(Self {
            session,
            model: model.clone(),
        })
    }

    /// The model's input resolution as `(width, height)`.
    pub fn input_size(&self) -> (u32, u32) {
        (self.model.input_width, self.model.input_height)
    }

    /// Check whether the model file exists on disk.
    pub fn model_exists(model: &ModelConfig, model_dir: &Path) -> bool {
        Self::model_path(model, model_dir).exists()
    }

    /// Get the expected model file path.
    pub fn model_path(model: &ModelConfig, model_dir: &Path) -> PathBuf {
        model_dir.join(model.file_name())
    }
}

impl Stylize for CartoonEngine {
    fn stylize(
        &self,
        image: &DynamicImage,
        orientation: Orientation,
        original_size: Option<(u32, u32)>,
    ) -> Result<DynamicImage, PipelineError> {
        let (width, height) = self.input_size();

        tracing::debug!("Preprocessing to {width}x{height} ({orientation:?})");
        let tensor = preprocess(image, width, height, orientation, self.model.input)?;

        tracing::debug!("Invoking generator");
        let output = self.session.run(&tensor)?;

        tracing::debug!("Postprocessing output");
        postprocess_rgb(&output, width, height, self.model.output, original_size)
    }
}
