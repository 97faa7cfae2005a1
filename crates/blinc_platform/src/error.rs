//! Platform error types

use thiserror::Error;

use crate::WindowId;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The display refused or failed to deliver a synthetic event
    #[error("Event injection failed: {0}")]
    InjectFailed(String),

    /// The target window is not known to the display
    #[error("Unknown window: {0}")]
    UnknownWindow(WindowId),

    /// Operation not supported by this display backend
    #[error("Platform not supported: {0}")]
    Unsupported(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
