//! Viewer error types.

use thiserror::Error;

/// Error codes for recoverable viewer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Image loading
    ImageNotFound,
    ImageReadFailed,
    UnsupportedImageScheme,
    UnsupportedImageFormat,
    InvalidImageRef,

    // Manifests
    InvalidManifest,
    ManifestItemNotFound,

    // Configuration
    InvalidConfig,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ImageNotFound => "ImageNotFound",
            ErrorCode::ImageReadFailed => "ImageReadFailed",
            ErrorCode::UnsupportedImageScheme => "UnsupportedImageScheme",
            ErrorCode::UnsupportedImageFormat => "UnsupportedImageFormat",
            ErrorCode::InvalidImageRef => "InvalidImageRef",
            ErrorCode::InvalidManifest => "InvalidManifest",
            ErrorCode::ManifestItemNotFound => "ManifestItemNotFound",
            ErrorCode::InvalidConfig => "InvalidConfig",
        }
    }

    /// Returns the default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ImageNotFound => "The specified image does not exist.",
            ErrorCode::ImageReadFailed => "The image could not be read.",
            ErrorCode::UnsupportedImageScheme => {
                "The image reference uses a scheme this loader cannot resolve."
            }
            ErrorCode::UnsupportedImageFormat => "The image data is not in a supported format.",
            ErrorCode::InvalidImageRef => "The image reference is not a valid URL or path.",
            ErrorCode::InvalidManifest => "The manifest document is invalid.",
            ErrorCode::ManifestItemNotFound => "The manifest has no item with that name.",
            ErrorCode::InvalidConfig => "The configuration is invalid.",
        }
    }
}

/// Viewer error with code and message.
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ViewerError {
    pub code: ErrorCode,
    pub message: String,
}

impl ViewerError {
    /// Creates a new error with the given code and default message.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.default_message().to_string(),
            code,
        }
    }

    /// Creates a new error with a custom message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type alias for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;
