//! Unified error types for tamperscan
//!
//! Error strategy:
//! - Per-image errors (decode, unsupported format): Recoverable, skip and continue
//! - System errors (output, configuration): Fatal, abort batch
//!
//! Metadata parse failures and degenerate geometry never surface here; the
//! analyzers absorb them into their own result fields.

use std::path::PathBuf;
use thiserror::Error;

/// Supported image formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "JPEG, PNG, TIFF, WebP, BMP";

/// Top-level error type for tamperscan operations
#[derive(Debug, Error)]
pub enum TamperError {
    // =========================================================================
    // Recoverable errors - skip image, continue batch
    // =========================================================================
    #[error("Failed to decode image '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file opens in other viewers, it may use an unsupported codec variant")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported image format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Invalid raster: {reason}")]
    InvalidRaster { reason: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tamperscan operations
pub type Result<T> = std::result::Result<T, TamperError>;

impl TamperError {
    /// Returns true if this error is recoverable (should skip image, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TamperError::DecodeError { .. }
                | TamperError::UnsupportedFormat { .. }
                | TamperError::InvalidRaster { .. }
                | TamperError::FileNotFound(_)
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TamperError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        TamperError::OutputError { path, reason }
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Attach the image path to a decode failure
    fn with_file_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn with_file_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| TamperError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(TamperError::decode_error("a.png", "bad header").is_recoverable());
        assert!(TamperError::InvalidRaster { reason: "short".into() }.is_recoverable());
        assert!(!TamperError::ConfigError("threshold".into()).is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!TamperError::output_error("/out/report.json", io).is_recoverable());
    }

    #[test]
    fn test_file_context_wraps_as_decode_error() {
        let failed: std::result::Result<(), &str> = Err("truncated stream");
        let err = failed
            .with_file_context(std::path::Path::new("/evidence/photo.jpg"))
            .unwrap_err();
        assert!(matches!(err, TamperError::DecodeError { .. }));
        assert!(err.to_string().contains("truncated stream"));
    }
}
