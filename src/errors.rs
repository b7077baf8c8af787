//! Centralized error handling for TempoCube
//!
//! This module provides structured error types to replace the generic `Box<dyn Error>`
//! pattern, enabling better error context and type safety across cube operations.

use std::fmt;

/// Main error type for TempoCube operations
#[derive(Debug)]
pub enum TempoCubeError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// Coordinate not found on a cube
    CoordinateNotFound { coord: String },

    /// Time coordinate has no bounds, so interval weights cannot be derived
    MissingBounds { coord: String },

    /// Month number outside the 1..=12 range
    InvalidMonth { month: u32 },

    /// Date cannot be represented or converted under the active calendar
    DateConversion(String),

    /// Malformed time units string (expected "<base> since <date>")
    UnitParse(String),

    /// Aggregation or collapse failure
    AggregationError(String),

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error for everything else
    Generic(String),
}

impl fmt::Display for TempoCubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempoCubeError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            TempoCubeError::IoError(e) => write!(f, "I/O error: {}", e),
            TempoCubeError::ArrayError(e) => write!(f, "Array error: {}", e),
            TempoCubeError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            TempoCubeError::CoordinateNotFound { coord } => {
                write!(f, "Coordinate '{}' not found on cube", coord)
            }
            TempoCubeError::MissingBounds { coord } => {
                write!(f, "Coordinate '{}' has no bounds", coord)
            }
            TempoCubeError::InvalidMonth { month } => write!(
                f,
                "Please provide a month number between 1 and 12 (got {})",
                month
            ),
            TempoCubeError::DateConversion(msg) => write!(f, "Date conversion error: {}", msg),
            TempoCubeError::UnitParse(msg) => write!(f, "Invalid time units: {}", msg),
            TempoCubeError::AggregationError(msg) => write!(f, "Aggregation error: {}", msg),
            TempoCubeError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            TempoCubeError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TempoCubeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TempoCubeError::NetCDFError(e) => Some(e),
            TempoCubeError::IoError(e) => Some(e),
            TempoCubeError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for TempoCubeError {
    fn from(error: netcdf::Error) -> Self {
        TempoCubeError::NetCDFError(error)
    }
}

impl From<std::io::Error> for TempoCubeError {
    fn from(error: std::io::Error) -> Self {
        TempoCubeError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for TempoCubeError {
    fn from(error: ndarray::ShapeError) -> Self {
        TempoCubeError::ArrayError(error)
    }
}

impl From<String> for TempoCubeError {
    fn from(error: String) -> Self {
        TempoCubeError::Generic(error)
    }
}

impl From<&str> for TempoCubeError {
    fn from(error: &str) -> Self {
        TempoCubeError::Generic(error.to_string())
    }
}

/// Result type alias for TempoCube operations
pub type Result<T> = std::result::Result<T, TempoCubeError>;
