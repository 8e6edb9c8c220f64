//! Error types for the queue_forecast crate

use thiserror::Error;

/// Custom error types for the queue_forecast crate
#[derive(Debug, Error)]
pub enum QueueForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from the underlying calendar/regression math
    #[error("Math error: {0}")]
    MathError(#[from] queue_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading or writing cached CSV grids
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error reading or writing the persisted corpus
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, QueueForecastError>;
