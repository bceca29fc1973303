// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # egs-scraper Core
//!
//! Core types and models shared by all `egs-scraper` crates.
//!
//! ## Key Types
//!
//! ### Catalog
//! - [`CatalogNamespace`] / [`UrlSlug`] - The top-level namespace mapping
//! - [`CatalogItem`] - One item of a namespace, identified by [`CatalogId`]
//! - [`Categories`] - Category path accepting both API encodings
//! - [`CatalogPage`] / [`Paging`] - List endpoint payload
//!
//! ### Authentication
//! - [`OAuthCredentials`] - Access/refresh token pair with expiries
//! - [`ScraperState`] - Persisted state (output folder, client, credentials)

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Ids
    AccessToken,
    AuthorizationCode,
    CatalogId,
    CatalogNamespace,
    ClientId,
    ClientSecret,
    RefreshToken,
    UrlSlug,
    // Catalog
    CatalogItem,
    CatalogPage,
    Categories,
    KeyImage,
    NamespaceMap,
    Paging,
    CATEGORY_SEPARATOR,
    // Authentication
    OAuthCredentials,
    OAuthTokenResponse,
    ScraperState,
};
