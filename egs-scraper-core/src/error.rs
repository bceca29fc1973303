//! Core error types for `egs-scraper`.

use thiserror::Error;

/// Core error type for model construction and validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credentials where the access token outlives the refresh token.
    #[error("Invalid credentials: access token expires after refresh token")]
    InconsistentExpiry,
}
