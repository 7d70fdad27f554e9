//! Error types for compositing, solving and image adaptation

use std::fmt;
use std::path::PathBuf;

/// Main error type for all cloning operations
#[derive(Debug)]
pub enum CloneError {
    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Patch placement exceeds the target bounds
    ///
    /// Raised before any operator is built, so the target is never touched.
    OutOfBounds {
        /// Requested placement as (top, left, rows, cols)
        region: (usize, usize, usize, usize),
        /// Target dimensions (rows, cols)
        target: (usize, usize),
    },

    /// Iterative solve exhausted its iteration budget before reaching tolerance
    NonConvergence {
        /// Channel whose solve failed
        channel: usize,
        /// Iterations performed
        iterations: usize,
        /// Residual norm relative to the right-hand side when the solve stopped
        relative_residual: f64,
    },

    /// Input contains a NaN or infinite intensity
    NonFiniteInput {
        /// Which input carried the value ("source" or "target")
        image: &'static str,
        /// Row of the offending pixel
        row: usize,
        /// Column of the offending pixel
        col: usize,
    },

    /// Source and target disagree on the number of channels
    ChannelMismatch {
        /// Channels in the target image
        target: usize,
        /// Channels in the source patch
        source: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to save a composited image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Numerical computation produced invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for CloneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::OutOfBounds { region, target } => {
                let (top, left, rows, cols) = *region;
                write!(
                    f,
                    "Patch {rows}x{cols} at ({top}, {left}) exceeds target bounds {}x{}",
                    target.0, target.1
                )
            }
            Self::NonConvergence {
                channel,
                iterations,
                relative_residual,
            } => {
                write!(
                    f,
                    "Solver for channel {channel} did not converge after {iterations} iterations (relative residual {relative_residual:.3e})"
                )
            }
            Self::NonFiniteInput { image, row, col } => {
                write!(f, "Non-finite intensity in {image} at ({row}, {col})")
            }
            Self::ChannelMismatch { target, source } => {
                write!(
                    f,
                    "Channel count mismatch: target has {target}, source has {source}"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for CloneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for cloning results
pub type Result<T> = std::result::Result<T, CloneError>;

impl From<image::ImageError> for CloneError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for CloneError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<ndarray::ShapeError> for CloneError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Computation {
            operation: "reshape",
            reason: err.to_string(),
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> CloneError {
    CloneError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> CloneError {
    CloneError::Computation {
        operation,
        reason: reason.to_string(),
    }
}
