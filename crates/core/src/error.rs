//! Error types for FieldSeg

use thiserror::Error;

/// Main error type for FieldSeg operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error(
        "Shape mismatch in {stage}: expected ({}, {}), got ({}, {})",
        expected.0, expected.1, actual.0, actual.1
    )]
    ShapeMismatch {
        stage: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::ShapeMismatch`] for `stage` from two raster shapes
    pub fn shape_mismatch(
        stage: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Error::ShapeMismatch {
            stage,
            expected,
            actual,
        }
    }
}

/// Result type alias for FieldSeg operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_names_stage() {
        let err = Error::shape_mismatch("region separator", (10, 12), (10, 11));
        let msg = err.to_string();
        assert!(msg.contains("region separator"), "got: {}", msg);
        assert!(msg.contains("(10, 12)"), "got: {}", msg);
        assert!(msg.contains("(10, 11)"), "got: {}", msg);
    }
}
