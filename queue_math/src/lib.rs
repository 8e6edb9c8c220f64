//! # Queue Math
//!
//! Mathematical building blocks for queue-position forecasting.
//! This crate provides the business-day calendar used as the regression's
//! time axis, normalization of two-part queue identifiers, and a closed-form
//! weighted least-squares fit with prediction standard errors.

use thiserror::Error;

pub mod ident;
pub mod regression;
pub mod workdays;

/// Errors that can occur in queue-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for queue math operations
pub type Result<T> = std::result::Result<T, MathError>;
