//! Toonify Core - photo cartoonization pipeline.
//!
//! Toonify turns photos into cartoon renderings with a pretrained
//! CartoonGAN-style generator running locally via ONNX Runtime.
//!
//! # Architecture
//!
//! ```text
//! Photo → Validate → Decode → Orient upright → Normalize to tensor
//!       → Generator (ONNX) → Denormalize to pixels → Encode/Write
//! ```
//!
//! The numeric stages (preprocess, inference, postprocess) run as one atomic
//! unit inside a single dedicated worker; file handling and output live in
//! [`PhotoProcessor`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use toonify_core::{Config, PhotoProcessor, ProcessOptions};
//!
//! #[tokio::main]
//! async fn main() -> toonify_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = PhotoProcessor::new(&config)?;
//!
//!     let record = processor
//!         .process("./photo.jpg".as_ref(), &ProcessOptions::default())
//!         .await?;
//!     println!("Wrote {:?}", record.output_path);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod worker;

// Re-exports for convenient access
pub use config::{Config, ModelConfig, Normalization};
pub use engine::{CartoonEngine, Stylize};
pub use error::{ConfigError, PipelineError, PipelineResult, Result, ToonifyError};
pub use output::{ImageWriter, OutputFormat};
pub use pipeline::orientation::{AffineTransform, Orientation};
pub use pipeline::postprocess::{postprocess, postprocess_rgb};
pub use pipeline::preprocess::preprocess;
pub use pipeline::{PhotoProcessor, ProcessOptions};
pub use types::{CartoonizedPhoto, ProcessingStats};
pub use worker::WorkerHandle;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    /// End-to-end marshalling check: an upright all-white 2x2 photo becomes
    /// twelve 1.0 floats, and twelve -1.0 floats come back as black pixels.
    #[test]
    fn test_marshalling_round_trip_contract() {
        use image::{DynamicImage, Rgba, RgbaImage};

        let model = ModelConfig::default();
        let white = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([255, 255, 255, 255]),
        ));

        let tensor = preprocess(&white, 2, 2, Orientation::Upright, model.input).unwrap();
        assert_eq!(tensor.len(), 12);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let black = vec![-1.0f32; 12];
        let image = postprocess(&black, 2, 2, model.output, None).unwrap();
        let rgba = image.to_rgba8();
        assert!(rgba
            .as_raw()
            .chunks_exact(4)
            .all(|px| px[0] == 0 && px[1] == 0 && px[2] == 0));
    }
}
