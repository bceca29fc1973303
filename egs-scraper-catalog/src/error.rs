//! Catalog crate error types.

use egs_scraper_core::CatalogNamespace;
use egs_scraper_fetch::{CatalogError, HttpError};
use egs_scraper_store::{AuthError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Discovery Error
// ============================================================================

/// Failure to pull the namespace mapping out of a storefront page.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A marker (or the opening brace after the last one) is missing.
    #[error("Found no \"{0}\" in document")]
    MarkerNotFound(&'static str),

    /// The mapping object is never closed.
    #[error("Namespace object has unbalanced braces")]
    UnbalancedBraces,

    /// The mapping object isn't a JSON string map.
    #[error("Namespace object is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

// ============================================================================
// Render Error
// ============================================================================

/// Failure to obtain a page's HTML.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Reading a saved page failed.
    #[error("Failed to read page from {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Fetching the page failed.
    #[error("Failed to fetch page: {0}")]
    Http(#[from] HttpError),
}

// ============================================================================
// Scrape Error
// ============================================================================

/// Error of a scraper run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No usable token. Aborts the whole run.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Enumerating one namespace failed.
    #[error("Catalog error for namespace {namespace}: {source}")]
    Catalog {
        /// Namespace being scraped.
        namespace: CatalogNamespace,
        /// Underlying error.
        source: CatalogError,
    },

    /// Reading or writing local files failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The namespace mapping couldn't be extracted.
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The discovery page couldn't be obtained.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Scraping was started before any namespaces were discovered.
    #[error("Namespace mapping {0} does not exist, run namespace discovery first")]
    MappingMissing(PathBuf),

    /// The run was cancelled.
    #[error("Scrape cancelled")]
    Cancelled,
}

impl ScrapeError {
    /// Returns true if the error stops the whole run rather than just the
    /// current namespace.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::Auth(_) | ScrapeError::Cancelled | ScrapeError::MappingMissing(_)
        )
    }
}
