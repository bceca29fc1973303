// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # egs-scraper Fetch
//!
//! Network plumbing for the Epic Games Store catalog scraper.
//!
//! - [`http::HttpClient`] - reqwest wrapper with tracing, cancellation and a
//!   domain allowlist
//! - [`oauth::OAuthClient`] - token endpoint client (authorization code and
//!   refresh token grants)
//! - [`rate_limit::FixedWindowRateLimiter`] - fixed-window gate with a bounded
//!   FIFO queue
//! - [`catalog::CatalogPager`] - lazy, cancellable enumeration of a namespace
//! - [`context::FetchContext`] - bundles the above for one run
//!
//! ## Example
//!
//! ```ignore
//! use egs_scraper_fetch::{CatalogRequest, FetchContext};
//! use futures::StreamExt;
//!
//! let ctx = FetchContext::new()?;
//! let pager = ctx.pager();
//! let mut items = pager.enumerate(token, namespace, CatalogRequest::default(), cancel);
//! while let Some(item) = items.next().await {
//!     println!("{}", item?.title);
//! }
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod http;
pub mod oauth;
pub mod rate_limit;

// Errors
pub use error::{CatalogError, HttpError, OAuthError, RateLimitError};

// Clients
pub use catalog::{CatalogPager, CatalogRequest, CATALOG_BASE_URL};
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use http::HttpClient;
pub use oauth::{
    authorization_url, OAuthClient, TokenExchange, TokenGrant, DEFAULT_CLIENT_ID,
    DEFAULT_CLIENT_SECRET, OAUTH_TOKEN_URL,
};
pub use rate_limit::{
    FixedWindowRateLimiter, RateLimitLease, RateLimiter, RateLimiterConfig, UnlimitedRateLimiter,
};
