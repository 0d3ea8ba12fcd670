//! Request-level errors raised before any domain logic runs.

use thiserror::Error;

/// Errors not owned by a domain module.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller could not be identified.
    #[error("Unidentified caller: {0}")]
    Unauthorized(String),

    /// No route or resource matches the request.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }
}
