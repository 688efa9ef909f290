//! Error types for the cubelet viewer.

use thiserror::Error;

/// Errors raised at the fallible edges of the app.
///
/// Cube geometry itself never fails: turning an empty slice or missing every
/// cubelet with a pointer ray is a silent no-op.
#[derive(Error, Debug)]
pub(crate) enum CubeError {
    /// Reading the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for [`crate::config::CubeSettings`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings parsed but hold values the viewer cannot use.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The view-projection matrix has no inverse, so no pointer ray exists.
    #[error("camera view-projection matrix is not invertible")]
    Unprojectable,
}

/// A specialized Result type for cubelet operations.
pub(crate) type Result<T> = std::result::Result<T, CubeError>;
