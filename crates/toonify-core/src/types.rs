//! Core data types for the toonify pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The record produced by cartoonizing one photo file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartoonizedPhoto {
    /// Absolute path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Where the cartoonized image was written
    pub output_path: PathBuf,

    /// Source photo width in pixels
    pub source_width: u32,

    /// Source photo height in pixels
    pub source_height: u32,

    /// Output image width in pixels
    pub width: u32,

    /// Output image height in pixels
    pub height: u32,

    /// Detected source format ("jpeg", "png", ...)
    pub format: String,

    /// Source file size in bytes
    pub file_size: u64,

    /// Wall-clock pipeline time in milliseconds
    pub elapsed_ms: u64,
}

/// Processing statistics for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Total photos cartoonized successfully
    pub succeeded: usize,

    /// Total photos that failed
    pub failed: usize,

    /// Processing rate in photos per second
    pub photos_per_second: f64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}

impl ProcessingStats {
    /// Build stats from counts and the elapsed batch duration.
    pub fn from_run(succeeded: usize, failed: usize, elapsed: std::time::Duration) -> Self {
        let total_seconds = elapsed.as_secs_f64();
        let photos_per_second = if total_seconds > 0.0 {
            succeeded as f64 / total_seconds
        } else {
            0.0
        };
        Self {
            succeeded,
            failed,
            photos_per_second,
            total_seconds,
        }
    }
}
