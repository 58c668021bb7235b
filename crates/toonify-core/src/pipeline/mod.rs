//! Pipeline stages and file-level orchestration.
//!
//! `validate → decode → read orientation → stylize → write`, with the
//! stylize step (preprocess, inference, postprocess) owned by the worker.

pub(crate) mod decode;
pub(crate) mod discovery;
pub mod orientation;
pub mod postprocess;
pub mod preprocess;
pub(crate) mod validate;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::engine::{CartoonEngine, Stylize};
use crate::error::Result;
use crate::output::ImageWriter;
use crate::types::CartoonizedPhoto;
use crate::worker::{self, WorkerHandle};

use self::decode::{format_to_string, ImageDecoder};
use self::discovery::FileDiscovery;
use self::orientation::Orientation;
use self::validate::Validator;

/// Options for controlling photo processing behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Write results into this directory instead of next to the source
    pub output_dir: Option<PathBuf>,

    /// Keep the model's output resolution instead of restoring the source
    /// photo's aspect
    pub keep_model_size: bool,
}

/// The file-level front end of the pipeline.
///
/// Owns the validation, decode, and output stages directly and hands the
/// numeric pipeline to the single worker, so at most one photo is inside
/// the engine at a time no matter how many callers share the processor.
pub struct PhotoProcessor {
    validator: Validator,
    decoder: ImageDecoder,
    discovery: FileDiscovery,
    writer: ImageWriter,
    handle: WorkerHandle,
    restore_original_size: bool,
}

impl PhotoProcessor {
    /// Load the engine from configuration and spawn the worker around it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &Config) -> Result<Self> {
        let engine = CartoonEngine::load(&config.model, &config.model_dir())?;
        Ok(Self::with_engine(config, engine))
    }

    /// Build a processor around an already-constructed engine.
    pub fn with_engine<S: Stylize>(config: &Config, engine: S) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
            writer: ImageWriter::new(&config.output),
            handle: worker::spawn(engine, &config.worker),
            restore_original_size: config.output.restore_original_size,
        }
    }

    /// Cartoonize a single photo file and write the result.
    pub async fn process(
        &self,
        path: &Path,
        options: &ProcessOptions,
    ) -> Result<CartoonizedPhoto> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        self.validator.validate(path)?;

        let decoded = self.decoder.decode(path).await?;
        tracing::trace!("  Decoded {}x{}", decoded.width, decoded.height);

        let orientation = Orientation::read_from(path);
        tracing::trace!("  Orientation: {:?}", orientation);

        // The decoded dimensions are in storage order; the displayed photo
        // swaps them for sideways orientations.
        let (source_width, source_height) = if orientation.transposes() {
            (decoded.height, decoded.width)
        } else {
            (decoded.width, decoded.height)
        };
        let original_size = if self.restore_original_size && !options.keep_model_size {
            Some((source_width, source_height))
        } else {
            None
        };

        let cartoon = self
            .handle
            .submit(decoded.image, orientation, original_size)
            .await?;

        let output_path = self.writer.output_path(path, options.output_dir.as_deref());
        self.writer.write(&cartoon, &output_path)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let elapsed = start.elapsed();
        tracing::debug!(
            "Cartoonized {:?} in {:?} ({}x{} -> {}x{})",
            file_name,
            elapsed,
            source_width,
            source_height,
            cartoon.width(),
            cartoon.height()
        );

        Ok(CartoonizedPhoto {
            file_path: path.to_path_buf(),
            file_name,
            output_path,
            source_width,
            source_height,
            width: cartoon.width(),
            height: cartoon.height(),
            format: format_to_string(decoded.format),
            file_size: decoded.file_size,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    /// Discover all supported photo files at a path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        self.discovery.discover(path)
    }

    /// The submission handle for in-memory images, bypassing the file
    /// stages.
    pub fn handle(&self) -> &WorkerHandle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, ToonifyError};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Engine stand-in that paints the output a solid color at a fixed
    /// model resolution, honoring the resize-back contract.
    struct SolidEngine;

    impl Stylize for SolidEngine {
        fn stylize(
            &self,
            _image: &DynamicImage,
            _orientation: Orientation,
            original_size: Option<(u32, u32)>,
        ) -> std::result::Result<DynamicImage, PipelineError> {
            let tensor = vec![0.0f32; 8 * 8 * 3];
            crate::pipeline::postprocess::postprocess_rgb(
                &tensor,
                8,
                8,
                crate::config::Normalization {
                    mean: 1.0,
                    std: 127.5,
                },
                original_size,
            )
        }
    }

    fn write_photo(path: &Path, width: u32, height: u32) {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([200, 100, 50]),
        ));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        std::fs::write(path, buffer.into_inner()).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_writes_output_record() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_photo(&source, 16, 8);

        let config = Config::default();
        let processor = PhotoProcessor::with_engine(&config, SolidEngine);

        let record = processor
            .process(&source, &ProcessOptions::default())
            .await
            .unwrap();

        assert_eq!(record.file_name, "photo.png");
        assert_eq!((record.source_width, record.source_height), (16, 8));
        // Larger source axis lands on the model resolution (8), aspect kept
        assert_eq!((record.width, record.height), (8, 4));
        assert_eq!(record.format, "png");
        assert!(record.output_path.ends_with("photo-cartoon.png"));
        assert!(record.output_path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_missing_file_fails_validation() {
        let config = Config::default();
        let processor = PhotoProcessor::with_engine(&config, SolidEngine);

        let result = processor
            .process(Path::new("/nonexistent/photo.png"), &ProcessOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(ToonifyError::Pipeline(PipelineError::FileNotFound(_)))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_keep_model_size() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_photo(&source, 16, 8);

        let config = Config::default();
        let processor = PhotoProcessor::with_engine(&config, SolidEngine);

        let record = processor
            .process(
                &source,
                &ProcessOptions {
                    keep_model_size: true,
                    ..ProcessOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!((record.width, record.height), (8, 8));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_respects_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_photo(&source, 8, 8);
        let out_dir = dir.path().join("out");

        let config = Config::default();
        let processor = PhotoProcessor::with_engine(&config, SolidEngine);

        let record = processor
            .process(
                &source,
                &ProcessOptions {
                    output_dir: Some(out_dir.clone()),
                    ..ProcessOptions::default()
                },
            )
            .await
            .unwrap();

        assert!(record.output_path.starts_with(&out_dir));
        assert!(record.output_path.exists());
    }
}
