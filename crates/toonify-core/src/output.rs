//! Encoding and writing of cartoonized images.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::config::OutputConfig;
use crate::error::PipelineError;

/// Output image format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }
}

/// Writes cartoonized images to disk.
pub struct ImageWriter {
    format: OutputFormat,
    quality: u8,
    suffix: String,
}

impl ImageWriter {
    /// Create a writer from the output configuration. An unknown format
    /// string falls back to PNG.
    pub fn new(config: &OutputConfig) -> Self {
        let format = OutputFormat::parse(&config.format).unwrap_or(OutputFormat::Png);
        Self {
            format,
            quality: config.quality,
            suffix: config.suffix.clone(),
        }
    }

    /// Derive the output path for a source file: the source stem plus the
    /// configured suffix and format extension, in `output_dir` if given,
    /// otherwise next to the source.
    pub fn output_path(&self, source: &Path, output_dir: Option<&Path>) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("photo");
        let file_name = format!("{stem}{}.{}", self.suffix, self.format.extension());

        match output_dir {
            Some(dir) => dir.join(file_name),
            None => source.with_file_name(file_name),
        }
    }

    /// Encode an image into the configured format.
    ///
    /// The generated alpha slot is a padding byte, so encoding always works
    /// from the packed RGB pixels.
    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buffer = Cursor::new(Vec::new());

        let result = match self.format {
            OutputFormat::Png => rgb.write_to(&mut buffer, ImageFormat::Png),
            OutputFormat::WebP => rgb.write_to(&mut buffer, ImageFormat::WebP),
            OutputFormat::Jpeg => {
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, self.quality);
                rgb.write_with_encoder(encoder)
            }
        };

        result.map_err(|e| PipelineError::Postprocess {
            message: format!("Failed to encode image: {e}"),
        })?;
        Ok(buffer.into_inner())
    }

    /// Encode and write an image to `path`, creating parent directories.
    pub fn write(&self, image: &DynamicImage, path: &Path) -> Result<(), PipelineError> {
        let bytes = self.encode(image)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::Write {
                path: path.to_path_buf(),
                message: format!("Cannot create output directory: {e}"),
            })?;
        }
        std::fs::write(path, bytes).map_err(|e| PipelineError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
