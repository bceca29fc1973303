//! Domain models for egs-scraper.
//!
//! ## Submodules
//!
//! - [`ids`] - String value objects (namespace, slug, tokens, item id)
//! - [`categories`] - Category paths with their two wire encodings
//! - [`item`] - Catalog items and list-endpoint pages
//! - [`credentials`] - OAuth credentials and the persisted scraper state

pub mod categories;
pub mod credentials;
pub mod ids;
pub mod item;

pub use categories::{Categories, CATEGORY_SEPARATOR};
pub use credentials::{OAuthCredentials, OAuthTokenResponse, ScraperState};
pub use ids::{
    AccessToken, AuthorizationCode, CatalogId, CatalogNamespace, ClientId, ClientSecret,
    RefreshToken, UrlSlug,
};
pub use item::{CatalogItem, CatalogPage, KeyImage, Paging};

/// Top-level namespace to slug mapping, ordered for stable file output.
pub type NamespaceMap = std::collections::BTreeMap<CatalogNamespace, UrlSlug>;

#[cfg(test)]
mod serde_tests;
