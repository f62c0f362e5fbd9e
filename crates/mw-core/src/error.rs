//! # AppError
//!
//! Centralized error handling for movewiki.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all mw-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Move, Listing)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Submitted fields failed validation; carries every message in order
    #[error("validation error: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// A specialized Result type for movewiki logic.
pub type Result<T> = std::result::Result<T, AppError>;
