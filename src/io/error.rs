//! Error types for palette ingestion, selection, assembly and export

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// A palette image could not be read or decoded
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// A caller-supplied value violates a precondition
    ///
    /// Covers an empty candidate pool, a malformed target grid and
    /// invalid configuration values.
    InvalidArgument {
        /// Name of the offending argument
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A chosen candidate could not be drawn into its cell
    Compositing {
        /// Grid row of the failing cell
        row: usize,
        /// Grid column of the failing cell
        col: usize,
        /// Pool index of the chosen candidate
        candidate: usize,
        /// Description of the failure
        reason: String,
    },

    /// The target grid file is not valid JSON of the expected shape
    TargetParse {
        /// Path to the target grid file
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// Failed to save the mosaic to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image encoding error
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

    /// Assembly was stopped through its cancellation flag
    Cancelled {
        /// Number of grid rows finished before the flag was observed
        completed_rows: usize,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidArgument {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid argument '{parameter}' = '{value}': {reason}")
            }
            Self::Compositing {
                row,
                col,
                candidate,
                reason,
            } => {
                write!(
                    f,
                    "Failed to draw candidate {candidate} into cell ({row}, {col}): {reason}"
                )
            }
            Self::TargetParse { path, source } => {
                write!(
                    f,
                    "Failed to parse target grid '{}': {source}",
                    path.display()
                )
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
            Self::Cancelled { completed_rows } => {
                write!(f, "Assembly cancelled after {completed_rows} completed rows")
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::TargetParse { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

impl From<image::ImageError> for MosaicError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl MosaicError {
    /// Whether this error is a caller precondition violation
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// Create an invalid argument error
pub fn invalid_argument(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidArgument {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
