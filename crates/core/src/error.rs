//! Error types for regrowth

use thiserror::Error;

/// Main error type for regrowth operations
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

    #[error("Plane for year {year} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        year: i32,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Year {year} is outside the continuous year range {first}..={last}")]
    InvalidIndex { year: i32, first: i32, last: i32 },

    #[error("Image stack is empty")]
    EmptyStack,

    #[error("Years must be strictly increasing: {previous} is followed by {next}")]
    YearsNotIncreasing { previous: i32, next: i32 },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for regrowth operations
pub type Result<T> = std::result::Result<T, Error>;
