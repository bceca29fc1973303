//! Store error types.

use egs_scraper_fetch::OAuthError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing local state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An existing file could not be parsed and was left untouched.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A server-supplied name can't be used as a file or directory name.
    #[error("Refusing to use {kind} {name:?} as a path component")]
    UnsafeName {
        /// What the name identifies.
        kind: &'static str,
        /// The rejected name.
        name: String,
    },
}

impl StoreError {
    /// Returns true if this error means the file simply doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Errors from [`crate::TokenLifecycleManager`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials have been stored yet; run `login` first.
    #[error("No OAuth credentials stored, log in first")]
    MissingCredentials,

    /// Both the access token and the refresh token have expired.
    #[error("OAuth credentials expired, log in again")]
    CredentialsExpired,

    /// The token endpoint failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// The new credentials could not be persisted.
    #[error("Failed to persist state: {0}")]
    State(#[from] StoreError),
}
