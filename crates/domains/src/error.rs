//! # AppError
//!
//! Centralized error handling for the vitrine ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Operation target absent from the structure it was expected in.
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Input rejected before any store call (missing url, bad day tag, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Bearer-token gate on the cleanup routes rejected the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Target is already on the other side of the active/disabled divide.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The media store or the metadata store failed mid-call. No
    /// partial-state guarantee is made for the enclosing operation.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// A specialized Result type for vitrine logic.
pub type Result<T> = std::result::Result<T, AppError>;
