// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # egs-scraper Catalog
//!
//! Namespace discovery and the resumable per-namespace scrape.
//!
//! ## Overview
//!
//! - [`extract_namespaces`] pulls the namespace mapping out of a storefront
//!   page obtained through a [`PageRenderer`]
//! - [`CatalogScraper`] merges that mapping into `namespaces.json` and then
//!   enumerates each namespace into its own directory, skipping finished
//!   ones
//!
//! ## Example
//!
//! ```ignore
//! use egs_scraper_catalog::{CatalogScraper, FileRenderer};
//!
//! let scraper = CatalogScraper::new(tokens, ctx.pager(), layout);
//! scraper.scrape_namespaces(&FileRenderer::new("store.html"), url, &cancel).await?;
//! let summary = scraper.scrape_api(&[], &cancel).await?;
//! ```

pub mod discovery;
pub mod error;
pub mod render;
pub mod scraper;

pub use discovery::{
    extract_namespaces, CLIENT_STATE_MARKER, LATEST_VALUE_MARKER, PRODUCT_INSTALL_MARKER,
};
pub use error::{DiscoveryError, RenderError, ScrapeError};
pub use render::{FileRenderer, HttpRenderer, PageRenderer};
pub use scraper::{CatalogScraper, NamespaceOutcome, ScrapeSummary};

/// Store page whose client state carries the namespace mapping.
pub const DEFAULT_DISCOVERY_PAGE: &str = egs_scraper_store::DEFAULT_DISCOVERY_URL;
