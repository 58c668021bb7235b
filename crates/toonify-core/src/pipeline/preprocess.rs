//! Image preprocessing for the cartoonization model.
//!
//! The generator expects:
//! - Input size: `input_width x input_height` from the model config
//! - Normalization: `(pixel - mean) / std` per channel
//! - Channel order: RGB, alpha stripped
//! - Tensor layout: NHWC `[batch, height, width, channels]`

use std::borrow::Cow;

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::config::Normalization;
use crate::error::PipelineError;
use crate::pipeline::orientation::Orientation;

/// Number of color channels fed to the model (RGB).
const CHANNELS: usize = 3;

/// Convert a decoded photo into the model's input tensor.
///
/// Applies the upright correction for `orientation`, resamples to the target
/// dimensions, strips alpha, and normalizes each channel. The result is a
/// channel-last `[1, H, W, 3]` tensor of length `target_width *
/// target_height * 3`, in row-major order.
pub fn preprocess(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    orientation: Orientation,
    norm: Normalization,
) -> Result<Array4<f32>, PipelineError> {
    if target_width == 0 || target_height == 0 {
        return Err(PipelineError::Preprocess {
            message: format!("invalid target size {target_width}x{target_height}"),
        });
    }

    // Identity fast path: the common upright case skips a full-image copy.
    let upright: Cow<'_, DynamicImage> = match orientation {
        Orientation::Upright => Cow::Borrowed(image),
        _ => Cow::Owned(orientation.correct(image)),
    };

    // Four-channel scratch buffer at the target dimensions; alpha is dropped
    // in the normalization walk below.
    let scratch = upright
        .resize_exact(target_width, target_height, FilterType::Lanczos3)
        .to_rgba8();

    let (w, h) = (target_width as usize, target_height as usize);
    let mut tensor = Array4::<f32>::zeros((1, h, w, CHANNELS));
    let data = tensor
        .as_slice_mut()
        .ok_or_else(|| PipelineError::Preprocess {
            message: "scratch tensor is not contiguous".to_string(),
        })?;

    // Walk the interleaved RGBA bytes directly rather than indexing the 4D
    // array per pixel. NHWC row-major offset for pixel i is simply i * 3.
    for (i, pixel) in scratch.as_raw().chunks_exact(4).enumerate() {
        let base = i * CHANNELS;
        data[base] = normalize(pixel[0], norm);
        data[base + 1] = normalize(pixel[1], norm);
        data[base + 2] = normalize(pixel[2], norm);
    }

    Ok(tensor)
}

/// Rescale one 8-bit channel value into the model's numeric range.
#[inline]
pub fn normalize(value: u8, norm: Normalization) -> f32 {
    (value as f32 - norm.mean) / norm.std
}
