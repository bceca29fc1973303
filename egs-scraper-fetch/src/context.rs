//! Fetch context providing the shared network plumbing.
//!
//! The context owns the one HTTP client and the one rate limiter of a run, and
//! hands out [`CatalogPager`]s and [`OAuthClient`]s wired to them. Every pager
//! produced from the same context shares the same limiter, so concurrent
//! namespace workers still respect a single request budget.

use std::sync::Arc;
use std::time::Duration;

use egs_scraper_core::{ClientId, ClientSecret};

use crate::catalog::{CatalogPager, CATALOG_BASE_URL};
use crate::error::HttpError;
use crate::http::{HttpClient, DEFAULT_TIMEOUT_SECS, EPIC_DOMAINS};
use crate::oauth::{OAuthClient, OAUTH_TOKEN_URL};
use crate::rate_limit::{FixedWindowRateLimiter, RateLimiter, RateLimiterConfig};

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for network operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Catalog endpoint base URL.
    pub catalog_base_url: String,
    /// OAuth token endpoint.
    pub oauth_token_url: String,
    /// Rate limiter parameters.
    pub rate_limit: RateLimiterConfig,
    /// Restrict requests to the production domains.
    pub restrict_domains: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_base_url: CATALOG_BASE_URL.to_string(),
            oauth_token_url: OAUTH_TOKEN_URL.to_string(),
            rate_limit: RateLimiterConfig::default(),
            restrict_domains: true,
        }
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Shared HTTP client and rate limiter for one scraper run.
#[derive(Clone)]
pub struct FetchContext {
    /// HTTP client with tracing.
    pub http: HttpClient,
    /// Rate limiter gating every catalog request.
    pub limiter: Arc<dyn RateLimiter>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context with default settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: FetchSettings) -> Result<Self, HttpError> {
        Self::builder().settings(settings).build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns a pager bound to the shared client and limiter.
    pub fn pager(&self) -> CatalogPager {
        CatalogPager::new(self.http.clone(), Arc::clone(&self.limiter))
            .with_base_url(self.settings.catalog_base_url.clone())
    }

    /// Returns a token client for the given OAuth client.
    pub fn oauth_client(&self, client_id: ClientId, client_secret: ClientSecret) -> OAuthClient {
        OAuthClient::new(self.http.clone(), client_id, client_secret)
            .with_token_url(self.settings.oauth_token_url.clone())
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
#[derive(Default)]
pub struct FetchContextBuilder {
    http: Option<HttpClient>,
    limiter: Option<Arc<dyn RateLimiter>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the rate limiter.
    #[must_use]
    pub fn limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> Result<FetchContext, HttpError> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let http = HttpClient::with_timeout(self.settings.timeout)?;
                if self.settings.restrict_domains {
                    http.allow_domains(EPIC_DOMAINS.iter().copied())
                } else {
                    http
                }
            }
        };

        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(FixedWindowRateLimiter::new(self.settings.rate_limit)));

        Ok(FetchContext {
            http,
            limiter,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
