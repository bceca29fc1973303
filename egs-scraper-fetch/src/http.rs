//! HTTP client with tracing, cancellation, and domain allowlist.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Domain allowlist so a misconfigured base URL can't leak tokens
//! - Cancellation of in-flight requests through a [`CancellationToken`]

use reqwest::{header, Client, RequestBuilder, Response};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use crate::error::HttpError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for egs-scraper.
const USER_AGENT: &str = concat!("egs-scraper/", env!("CARGO_PKG_VERSION"));

/// Domains the scraper talks to in production.
pub const EPIC_DOMAINS: &[&str] = &["epicgames.com"];

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing, cancellation, and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    #[must_use]
    pub fn allow_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Sends a prepared request, abandoning it if `cancel` fires.
    async fn send(&self, request: RequestBuilder, cancel: &CancellationToken) -> Result<Response, HttpError> {
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HttpError::Cancelled),
            response = request.send() => response?,
        };
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a GET request with query parameters and a bearer token.
    #[instrument(skip(self, query, token, cancel), fields(url = %url))]
    pub async fn get_with_bearer<Q: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request with bearer auth");

        let request = self.inner.get(url).query(query).bearer_auth(token);
        self.send(request, cancel).await
    }

    /// Performs a POST request with form data and a raw authorization header.
    #[instrument(skip(self, form, auth_header, cancel), fields(url = %url))]
    pub async fn post_form_with_auth<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        form: &T,
        auth_header: &str,
        cancel: &CancellationToken,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("POST request with form data");

        let request = self
            .inner
            .post(url)
            .header(header::AUTHORIZATION, auth_header)
            .form(form);
        self.send(request, cancel).await
    }

    /// Fetches a page body as text.
    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn get_text(&self, url: &str, cancel: &CancellationToken) -> Result<String, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request");

        let response = self.send(self.inner.get(url), cancel).await?;
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }
}

// ============================================================================
// Tests
// ============================================================================
