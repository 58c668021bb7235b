//! ONNX session management for the cartoonization generator.
//!
//! Loads a CartoonGAN-style image-to-image model exported to ONNX format and
//! runs single-image inference: `[1, H, W, 3]` floats in, the same spatial
//! shape out.

use std::path::Path;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

/// Wraps an ONNX Runtime session for the generator.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct CartoonSession {
    session: std::sync::Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
}

impl CartoonSession {
    /// Load the generator from an ONNX file.
    pub fn load(model_path: &Path) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::Allocation {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Allocation {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input_photo".to_string());

        tracing::debug!(
            "Loaded generator from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: std::sync::Mutex::new(session),
            input_name,
        })
    }

    /// Run the generator on a preprocessed `[1, H, W, 3]` tensor.
    ///
    /// Returns the raw output floats, validated to cover the same spatial
    /// shape as the input.
    pub fn run(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let expected_len = tensor.len();

        // Hand ort the shape and flat data directly rather than going
        // through its ndarray integration.
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Inference {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Inference {
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Inference {
            message: format!("ONNX inference failed: {e}"),
        })?;

        // Image-to-image generators produce a single output tensor.
        let output = outputs
            .iter()
            .next()
            .ok_or_else(|| PipelineError::Inference {
                message: "Model produced no outputs".to_string(),
            })?;

        let (out_shape, data) =
            output
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Inference {
                    message: format!("Failed to extract output tensor: {e}"),
                })?;

        if data.len() != expected_len {
            return Err(PipelineError::Inference {
                message: format!(
                    "Unexpected output shape {:?}: expected {} values, got {}",
                    out_shape,
                    expected_len,
                    data.len()
                ),
            });
        }

        Ok(data.to_vec())
    }
}
