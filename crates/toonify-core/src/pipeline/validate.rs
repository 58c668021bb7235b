//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Magic-byte signatures for the containers the decoder accepts, as
/// `(offset, bytes)` pairs.
const SIGNATURES: &[(usize, &[u8])] = &[
    (0, &[0xFF, 0xD8, 0xFF]),        // JPEG
    (0, b"\x89PNG"),                 // PNG
    (0, b"GIF8"),                    // GIF
    (0, b"RIFF"),                    // WebP (RIFF container)
    (0, b"BM"),                      // BMP
    (0, &[b'I', b'I', 0x2A, 0x00]),  // TIFF little-endian
    (0, &[b'M', b'M', 0x00, 0x2A]),  // TIFF big-endian
];

/// Validates files before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode: the file exists, its
    /// size is within limits, and it starts with known image magic bytes.
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {e}"),
        })?;
        let mut header = [0u8; 8];
        let read = file.read(&mut header).unwrap_or(0);

        if !matches_signature(&header[..read]) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }
}

fn matches_signature(header: &[u8]) -> bool {
    SIGNATURES.iter().any(|(offset, signature)| {
        header.len() >= offset + signature.len()
            && &header[*offset..offset + signature.len()] == *signature
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_jpeg() {
        assert!(matches_signature(&[0xFF, 0xD8, 0xFF, 0xE0]));
    }

    #[test]
    fn test_signature_png() {
        assert!(matches_signature(b"\x89PNG\x0D\x0A\x1A\x0A"));
    }

    #[test]
    fn test_signature_tiff_both_endians() {
        assert!(matches_signature(&[b'I', b'I', 0x2A, 0x00]));
        assert!(matches_signature(&[b'M', b'M', 0x00, 0x2A]));
        // Bare byte-order marks without the version are not TIFF
        assert!(!matches_signature(&[b'I', b'I', 0x00, 0x00]));
    }

    #[test]
    fn test_signature_garbage() {
        assert!(!matches_signature(&[0x00, 0x01, 0x02, 0x03]));
        assert!(!matches_signature(&[]));
    }

    #[test]
    fn test_validate_missing_file() {
        let validator = Validator::new(LimitsConfig::default());
        let result = validator.validate(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(PipelineError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let limits = LimitsConfig {
            max_file_size_mb: 0,
            ..LimitsConfig::default()
        };
        let validator = Validator::new(limits);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();

        let result = validator.validate(&path);
        assert!(matches!(result, Err(PipelineError::FileTooLarge { .. })));
    }

    #[test]
    fn test_validate_accepts_png_header() {
        let validator = Validator::new(LimitsConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        std::fs::write(&path, b"\x89PNG\x0D\x0A\x1A\x0A0000").unwrap();

        assert!(validator.validate(&path).is_ok());
    }
}
