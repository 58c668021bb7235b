//! Configuration management for toonify.
//!
//! Configuration is loaded from a TOML file in the platform config directory
//! with sensible defaults. The normalization constants and target dimensions
//! are model-specific and must come from configuration, never from code: the
//! pipeline itself is model-agnostic.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for toonify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Model settings (file name, input size, normalization)
    pub model: ModelConfig,

    /// Worker queue settings
    pub worker: WorkerConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Input handling settings
    pub processing: ProcessingConfig,

    /// Output image settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.toonify/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "toonify", "toonify")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".toonify").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.input_width == 0 || self.model.input_height == 0 {
            return Err(ConfigError::ValidationError(
                "model input dimensions must be non-zero".to_string(),
            ));
        }
        if self.model.input.std == 0.0 {
            return Err(ConfigError::ValidationError(
                "model input std must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.toonify/models"),
        }
    }
}

/// A linear pixel rescaling: `(value - mean) / std` on the way into the
/// model, `(value + mean) * std` on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub mean: f32,
    pub std: f32,
}

/// Model settings. The file name and extension are load-time configuration;
/// the normalization pairs differ between exported model variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model file name without extension
    pub name: String,

    /// Model file extension
    pub extension: String,

    /// Model input width in pixels
    pub input_width: u32,

    /// Model input height in pixels
    pub input_height: u32,

    /// Input normalization constants
    pub input: Normalization,

    /// Output denormalization constants
    pub output: Normalization,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "cartoongan_int8".to_string(),
            extension: "onnx".to_string(),
            input_width: 512,
            input_height: 512,
            input: Normalization {
                mean: 127.5,
                std: 127.5,
            },
            output: Normalization {
                mean: 1.0,
                std: 127.5,
            },
        }
    }
}

impl ModelConfig {
    /// The model file name including its extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

/// Worker queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Max photos waiting in the worker queue. Submissions beyond this
    /// either wait (`submit`) or are refused (`try_submit`).
    pub queue_depth: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { queue_depth: 4 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Input handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input formats
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Output image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format ("png", "jpeg" or "webp")
    pub format: String,

    /// JPEG quality (0-100)
    pub quality: u8,

    /// Suffix appended to the source file stem
    pub suffix: String,

    /// Rescale the model output back toward the source photo's aspect
    pub restore_original_size: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            quality: 90,
            suffix: "-cartoon".to_string(),
            restore_original_size: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.input_width, 512);
        assert_eq!(config.model.input.mean, 127.5);
        assert_eq!(config.model.output.std, 127.5);
        assert_eq!(config.worker.queue_depth, 4);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[model]"));
        assert!(toml.contains("[output]"));
    }

    #[test]
    fn test_model_file_name() {
        let model = ModelConfig::default();
        assert_eq!(model.file_name(), "cartoongan_int8.onnx");
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let mut config = Config::default();
        config.model.input_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ninput_width = 256\ninput_height = 256\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model.input_width, 256);
        // Unspecified sections keep their defaults
        assert_eq!(config.output.format, "png");
        assert_eq!(config.model.input.std, 127.5);
    }
}
