//! Fetch error types.

use thiserror::Error;

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request was abandoned because the operation was cancelled.
    #[error("Request cancelled")]
    Cancelled,
}

// ============================================================================
// OAuth Error
// ============================================================================

/// Error returned by the token endpoint client.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Transport error, non-success status or undecodable body.
    #[error("OAuth request to {url} failed: {message}")]
    Failure {
        /// Token endpoint URL.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// The exchange was cancelled before it completed.
    #[error("OAuth request cancelled")]
    Cancelled,
}

impl OAuthError {
    pub(crate) fn failure(url: &str, message: impl Into<String>) -> Self {
        Self::Failure {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Catalog Error
// ============================================================================

/// Terminal error of a catalog enumeration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The list endpoint failed or returned an unusable body.
    #[error("Catalog API error at {url} (start={start}): {message}")]
    Api {
        /// Request URL without query.
        url: String,
        /// Offset of the failing page.
        start: u64,
        /// What went wrong.
        message: String,
    },

    /// The server returned an empty page before reaching its own total.
    #[error("No progress for namespace {namespace} at {start}/{total}")]
    NoProgress {
        /// Namespace being enumerated.
        namespace: String,
        /// Offset that returned nothing.
        start: u64,
        /// Total the server reported.
        total: u64,
    },

    /// The rate limiter refused a permit.
    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    /// Enumeration was cancelled.
    #[error("Catalog enumeration cancelled")]
    Cancelled,
}

// ============================================================================
// Rate Limit Error
// ============================================================================

/// Error returned when a rate-limit permit cannot be obtained.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// Waiting for a permit was cancelled.
    #[error("Rate limiter wait cancelled")]
    Cancelled,

    /// Too many callers are already queued.
    #[error("Rate limiter queue is full ({limit} waiting)")]
    QueueFull {
        /// Configured queue limit.
        limit: usize,
    },
}
