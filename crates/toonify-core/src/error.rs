//! Error types for the toonify cartoonization pipeline.
//!
//! Errors are organized by pipeline stage so a failure can be reported to the
//! user with the stage that caused it. All errors are terminal for the
//! request that produced them; nothing is retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for toonify operations.
#[derive(Error, Debug)]
pub enum ToonifyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Model file missing or the inference session could not be built
    #[error("Model unavailable at {path}: {message}")]
    Allocation { path: PathBuf, message: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Converting the image into the model input tensor failed
    #[error("Preprocess error: {message}")]
    Preprocess { message: String },

    /// Invoking the model graph failed
    #[error("Inference error: {message}")]
    Inference { message: String },

    /// Converting the output tensor back into an image failed
    #[error("Postprocess error: {message}")]
    Postprocess { message: String },

    /// Encoding or writing the result image failed
    #[error("Write error for {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// The worker queue is full and the submission was refused
    #[error("Worker busy: submission refused")]
    Busy,

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl PipelineError {
    /// The pipeline stage this error belongs to, for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Allocation { .. } => "allocation",
            Self::Decode { .. } => "decode",
            Self::Preprocess { .. } => "preprocess",
            Self::Inference { .. } => "inference",
            Self::Postprocess { .. } => "postprocess",
            Self::Write { .. } => "write",
            Self::Busy => "submit",
            Self::Timeout { .. } => "timeout",
            Self::FileTooLarge { .. }
            | Self::ImageTooLarge { .. }
            | Self::UnsupportedFormat { .. }
            | Self::FileNotFound(_) => "validate",
        }
    }
}

/// Convenience type alias for toonify results.
pub type Result<T> = std::result::Result<T, ToonifyError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let err = PipelineError::Preprocess {
            message: "bad input".to_string(),
        };
        assert_eq!(err.stage(), "preprocess");
        assert_eq!(PipelineError::Busy.stage(), "submit");
    }

    #[test]
    fn test_pipeline_error_wraps_into_toonify_error() {
        let err: ToonifyError = PipelineError::Inference {
            message: "graph failed".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Inference error"));
    }
}
