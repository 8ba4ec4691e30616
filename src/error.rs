//! Error types for fitting and settings persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bounding box and scale computations.
pub type FitResult<T> = Result<T, FitError>;

/// Result type for settings import and export.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while measuring an object or computing its fit scale.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// No corner points were supplied.
    #[error("point set is empty")]
    EmptyPointSet,

    /// A corner point carries a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending point in the input sequence.
        index: usize,
    },

    /// Explicit box corners where min exceeds max.
    #[error("bounding box min exceeds max on the {axis} axis")]
    InvertedBounds {
        /// Axis name, one of `x`, `y`, `z`.
        axis: char,
    },

    /// The object has no measurable extent.
    #[error("degenerate geometry: largest dimension is {max_dimension}")]
    DegenerateGeometry {
        /// The largest extent that was measured.
        max_dimension: f64,
    },

    /// The box has extent, but the quotient overflowed or underflowed.
    #[error("scale for largest dimension {max_dimension} is not representable: {scale}")]
    ScaleOutOfRange {
        /// The largest extent that was measured.
        max_dimension: f64,
        /// The non-finite or zero quotient.
        scale: f64,
    },

    /// Marker size or fit fraction outside its accepted range.
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Errors raised while reading or writing a settings document.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The text is not JSON, or its top level is not an object.
    #[error("malformed settings document: {reason}")]
    MalformedDocument {
        /// Parser message or description of the top-level value.
        reason: String,
    },

    /// Reading or writing the settings file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SettingsError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
