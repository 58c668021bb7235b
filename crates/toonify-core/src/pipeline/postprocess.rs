//! Output tensor postprocessing.
//!
//! The generator emits a flat `[H, W, 3]` float buffer in the model's
//! numeric range. Denormalization is the algebraic inverse of the input
//! normalization, parameterized by the model's output constants:
//! `clamp(round((value + mean) * std), 0, 255)`. The clamp saturates;
//! out-of-range values never wrap.

use image::{imageops::FilterType, DynamicImage, RgbImage, RgbaImage};

use crate::config::Normalization;
use crate::error::PipelineError;

/// Convert a raw output tensor into an RGBA image.
///
/// The pixel buffer is `width * height * 4` bytes; the alpha slot is always
/// written as 0 (the model produces no alpha, the byte only pads the pixel
/// to 32 bits). If `original_size` is given and differs from the tensor
/// dimensions, the image is rescaled back toward the source photo's aspect,
/// never upscaling past it.
pub fn postprocess(
    tensor: &[f32],
    width: u32,
    height: u32,
    norm: Normalization,
    original_size: Option<(u32, u32)>,
) -> Result<DynamicImage, PipelineError> {
    check_len(tensor, width, height)?;

    let mut pixels = vec![0u8; (width * height) as usize * 4];
    for (i, value) in tensor.chunks_exact(3).enumerate() {
        let base = i * 4;
        pixels[base] = denormalize(value[0], norm);
        pixels[base + 1] = denormalize(value[1], norm);
        pixels[base + 2] = denormalize(value[2], norm);
        // pixels[base + 3] stays 0
    }

    let buffer =
        RgbaImage::from_raw(width, height, pixels).ok_or_else(|| PipelineError::Postprocess {
            message: "pixel buffer does not match output dimensions".to_string(),
        })?;

    Ok(restore_size(
        DynamicImage::ImageRgba8(buffer),
        width,
        height,
        original_size,
    ))
}

/// Convert a raw output tensor into a packed RGB image (no alpha slot).
///
/// Same denormalization and resize behavior as [`postprocess`], for
/// consumers whose downstream bitmap format rejects an alpha channel.
pub fn postprocess_rgb(
    tensor: &[f32],
    width: u32,
    height: u32,
    norm: Normalization,
    original_size: Option<(u32, u32)>,
) -> Result<DynamicImage, PipelineError> {
    check_len(tensor, width, height)?;

    let pixels: Vec<u8> = tensor.iter().map(|&v| denormalize(v, norm)).collect();
    let buffer =
        RgbImage::from_raw(width, height, pixels).ok_or_else(|| PipelineError::Postprocess {
            message: "pixel buffer does not match output dimensions".to_string(),
        })?;

    Ok(restore_size(
        DynamicImage::ImageRgb8(buffer),
        width,
        height,
        original_size,
    ))
}

fn check_len(tensor: &[f32], width: u32, height: u32) -> Result<(), PipelineError> {
    let expected = (width * height) as usize * 3;
    if tensor.len() != expected {
        return Err(PipelineError::Postprocess {
            message: format!(
                "tensor length mismatch: expected {expected} ({width}x{height}x3), got {}",
                tensor.len()
            ),
        });
    }
    Ok(())
}

fn restore_size(
    image: DynamicImage,
    width: u32,
    height: u32,
    original_size: Option<(u32, u32)>,
) -> DynamicImage {
    match original_size {
        Some((ow, oh)) if (ow, oh) != (width, height) => {
            let (nw, nh) = restored_size(width, height, ow, oh);
            if (nw, nh) == (width, height) {
                image
            } else {
                image.resize_exact(nw, nh, FilterType::Lanczos3)
            }
        }
        _ => image,
    }
}

/// Dimensions for the final resize back toward the source aspect.
///
/// The ratio comes from whichever source axis is larger, so that axis lands
/// exactly on the model resolution; the ratio is capped at 1 so a source
/// smaller than the model output is never upscaled.
pub fn restored_size(
    width: u32,
    height: u32,
    original_width: u32,
    original_height: u32,
) -> (u32, u32) {
    let ratio = if original_width >= original_height {
        width as f32 / original_width as f32
    } else {
        height as f32 / original_height as f32
    };
    let ratio = ratio.min(1.0);
    (
        ((original_width as f32 * ratio).round() as u32).max(1),
        ((original_height as f32 * ratio).round() as u32).max(1),
    )
}

/// Rescale one model output value into the displayable 8-bit range.
///
/// Saturating on both ends: a raw value that denormalizes past 255 clamps to
/// 255 and one below 0 clamps to 0.
#[inline]
pub fn denormalize(value: f32, norm: Normalization) -> u8 {
    ((value + norm.mean) * norm.std).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::preprocess::normalize;

    const OUT: Normalization = Normalization {
        mean: 1.0,
        std: 127.5,
    };

    #[test]
    fn test_postprocess_dimensions_and_alpha() {
        let tensor = vec![0.0f32; 4 * 3 * 3];
        let image = postprocess(&tensor, 4, 3, OUT, None).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));

        let rgba = image.to_rgba8();
        assert_eq!(rgba.as_raw().len(), 4 * 3 * 4);
        // Generated alpha is always 0
        assert!(rgba.as_raw().chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn test_postprocess_rgb_has_no_alpha_slot() {
        let tensor = vec![0.0f32; 2 * 2 * 3];
        let image = postprocess_rgb(&tensor, 2, 2, OUT, None).unwrap();
        assert_eq!(image.to_rgb8().as_raw().len(), 2 * 2 * 3);
    }

    #[test]
    fn test_postprocess_rejects_length_mismatch() {
        let tensor = vec![0.0f32; 11];
        let err = postprocess(&tensor, 2, 2, OUT, None).unwrap_err();
        assert!(matches!(err, PipelineError::Postprocess { .. }));
    }

    #[test]
    fn test_denormalize_negative_one_is_black() {
        // 12 floats of -1.0 with output 1.0/127.5 denormalize to 0
        let tensor = vec![-1.0f32; 2 * 2 * 3];
        let image = postprocess(&tensor, 2, 2, OUT, None).unwrap();
        let rgba = image.to_rgba8();
        assert!(rgba
            .as_raw()
            .chunks_exact(4)
            .all(|px| px[0] == 0 && px[1] == 0 && px[2] == 0));
    }

    #[test]
    fn test_denormalize_saturates_instead_of_wrapping() {
        // Raw values past the pixel range clamp to the boundary
        assert_eq!(denormalize(300.0, Normalization { mean: 0.0, std: 1.0 }), 255);
        assert_eq!(denormalize(-50.0, Normalization { mean: 0.0, std: 1.0 }), 0);
        // Just past the [-1, 1] model range
        assert_eq!(denormalize(1.2, OUT), 255);
        assert_eq!(denormalize(-1.2, OUT), 0);
    }

    #[test]
    fn test_normalize_denormalize_round_trip() {
        // With matching pairs, denormalize(normalize(x)) == x for all x
        let input = Normalization {
            mean: 127.5,
            std: 127.5,
        };
        for x in 0..=255u8 {
            assert_eq!(denormalize(normalize(x, input), OUT), x, "x = {x}");
        }
    }

    #[test]
    fn test_restored_size_landscape() {
        // Larger axis (width) lands on the model resolution
        assert_eq!(restored_size(512, 512, 4000, 3000), (512, 384));
    }

    #[test]
    fn test_restored_size_portrait() {
        assert_eq!(restored_size(512, 512, 3000, 4000), (384, 512));
    }

    #[test]
    fn test_restored_size_never_upscales() {
        // A source smaller than the model output keeps its own size
        assert_eq!(restored_size(512, 512, 300, 200), (300, 200));
    }

    #[test]
    fn test_postprocess_skips_resize_for_matching_size() {
        let tensor = vec![0.0f32; 2 * 2 * 3];
        let image = postprocess(&tensor, 2, 2, OUT, Some((2, 2))).unwrap();
        assert_eq!((image.width(), image.height()), (2, 2));
    }

    #[test]
    fn test_postprocess_restores_aspect() {
        let tensor = vec![0.0f32; 8 * 8 * 3];
        let image = postprocess(&tensor, 8, 8, OUT, Some((16, 8))).unwrap();
        assert_eq!((image.width(), image.height()), (8, 4));
    }
}
