//! Catalog list endpoint pager.
//!
//! [`CatalogPager::enumerate`] walks a namespace page by page, yielding each
//! item as soon as its page arrives. The stream ends after the last page or
//! after the first error, which is always the final element.

use async_stream::stream;
use egs_scraper_core::{AccessToken, CatalogItem, CatalogNamespace, CatalogPage};
use futures::Stream;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{CatalogError, HttpError, RateLimitError};
use crate::http::HttpClient;
use crate::rate_limit::RateLimiter;

/// Base URL of the per-namespace item endpoints.
pub const CATALOG_BASE_URL: &str =
    "https://catalog-public-service-prod.ol.epicgames.com/catalog/api/shared/namespace";

/// Items requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Default storefront country.
pub const DEFAULT_COUNTRY: &str = "US";

/// Default response locale.
pub const DEFAULT_LOCALE: &str = "en-US";

// ============================================================================
// Request
// ============================================================================

/// Per-enumeration query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    /// Items per page.
    pub page_size: u32,
    /// Storefront country code.
    pub country: String,
    /// Response locale.
    pub locale: String,
    /// Ask the API to inline DLC details.
    pub include_dlc_details: bool,
    /// Ask the API to inline main game details.
    pub include_main_game_details: bool,
}

impl Default for CatalogRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            country: DEFAULT_COUNTRY.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            include_dlc_details: true,
            include_main_game_details: true,
        }
    }
}

#[derive(Serialize)]
struct PageQuery<'a> {
    start: u64,
    count: u32,
    country: &'a str,
    locale: &'a str,
    #[serde(rename = "includeDLCDetails")]
    include_dlc_details: bool,
    #[serde(rename = "includeMainGameDetails")]
    include_main_game_details: bool,
}

// ============================================================================
// Pager
// ============================================================================

/// Rate-limited reader for the catalog list endpoint.
///
/// Holds no per-enumeration state, so one pager can serve any number of
/// namespaces concurrently.
#[derive(Clone)]
pub struct CatalogPager {
    http: HttpClient,
    limiter: Arc<dyn RateLimiter>,
    base_url: String,
}

impl CatalogPager {
    /// Creates a pager against the production endpoint.
    pub fn new(http: HttpClient, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            http,
            limiter,
            base_url: CATALOG_BASE_URL.to_string(),
        }
    }

    /// Overrides the endpoint base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL of the item list for a namespace.
    pub fn items_url(&self, namespace: &CatalogNamespace) -> String {
        format!(
            "{}/{}/items",
            self.base_url.trim_end_matches('/'),
            namespace.as_str()
        )
    }

    /// Lazily enumerates every item of `namespace`.
    ///
    /// Each page waits for a rate limiter lease first. Errors end the stream.
    /// A page that reports zero items while the offset is still below the
    /// reported total yields [`CatalogError::NoProgress`] instead of asking
    /// for the same page forever. A count that would overflow the offset
    /// yields [`CatalogError::Api`].
    pub fn enumerate(
        &self,
        token: AccessToken,
        namespace: CatalogNamespace,
        request: CatalogRequest,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<CatalogItem, CatalogError>> + Send + '_ {
        stream! {
            let url = self.items_url(&namespace);
            let mut current: u64 = 0;
            let mut total: Option<u64> = None;

            while total.is_none_or(|total| current < total) {
                if cancel.is_cancelled() {
                    yield Err(CatalogError::Cancelled);
                    break;
                }

                if let Err(e) = self.limiter.acquire(&cancel).await {
                    yield Err(match e {
                        RateLimitError::Cancelled => CatalogError::Cancelled,
                        other => other.into(),
                    });
                    break;
                }

                let page = match self.fetch_page(&url, &token, current, &request, &cancel).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                };

                let paging = page.paging;
                total = Some(paging.total);

                let Some(next) = current.checked_add(paging.count) else {
                    yield Err(CatalogError::Api {
                        url: url.clone(),
                        start: current,
                        message: format!("page count {} overflows offset {current}", paging.count),
                    });
                    break;
                };

                if next == current && current < paging.total {
                    yield Err(CatalogError::NoProgress {
                        namespace: namespace.to_string(),
                        start: current,
                        total: paging.total,
                    });
                    break;
                }

                current = next;

                for element in page.elements {
                    yield Ok(element);
                }

                info!("Status for \"{}\": {}/{}", namespace, current, paging.total);
            }
        }
    }

    /// Fetches and decodes one page.
    #[instrument(skip(self, token, request, cancel), fields(url = %url, start = start, count = request.page_size))]
    async fn fetch_page(
        &self,
        url: &str,
        token: &AccessToken,
        start: u64,
        request: &CatalogRequest,
        cancel: &CancellationToken,
    ) -> Result<CatalogPage, CatalogError> {
        let api_error = |message: String| CatalogError::Api {
            url: url.to_string(),
            start,
            message,
        };

        let query = PageQuery {
            start,
            count: request.page_size,
            country: &request.country,
            locale: &request.locale,
            include_dlc_details: request.include_dlc_details,
            include_main_game_details: request.include_main_game_details,
        };

        let response = self
            .http
            .get_with_bearer(url, &query, token.as_str(), cancel)
            .await
            .map_err(|e| match e {
                HttpError::Cancelled => CatalogError::Cancelled,
                other => api_error(format!("exception contacting endpoint: {other}")),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(format!("HTTP {status}: {body}")));
        }

        let page: CatalogPage = response
            .json()
            .await
            .map_err(|e| api_error(format!("failed to decode page: {e}")))?;

        debug!(
            count = page.paging.count,
            total = page.paging.total,
            elements = page.elements.len(),
            "Page decoded"
        );
        Ok(page)
    }
}

impl std::fmt::Debug for CatalogPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogPager")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::UnlimitedRateLimiter;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": format!("item{id}"),
            "title": format!("Item {id}"),
            "namespace": "ns",
            "categories": [{"path": "games"}],
            "creationDate": "2020-01-01T00:00:00.000Z",
            "lastModifiedDate": "2020-01-01T00:00:00.000Z"
        })
    }

    fn page(start: u64, count: u64, total: u64) -> serde_json::Value {
        let elements: Vec<_> = (start..start + count).map(item).collect();
        serde_json::json!({
            "paging": {"count": count, "start": start, "total": total},
            "elements": elements
        })
    }

    async fn mount_pages(server: &MockServer, total: u64, page_size: u64) {
        let mut start = 0;
        while start < total {
            let count = page_size.min(total - start);
            Mock::given(method("GET"))
                .and(path("/ns/items"))
                .and(query_param("start", start.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(page(start, count, total)))
                .expect(1)
                .mount(server)
                .await;
            start += page_size;
        }
    }

    fn pager(server: &MockServer, limiter: Arc<UnlimitedRateLimiter>) -> CatalogPager {
        CatalogPager::new(HttpClient::new().unwrap(), limiter).with_base_url(server.uri())
    }

    fn request(page_size: u32) -> CatalogRequest {
        CatalogRequest {
            page_size,
            ..Default::default()
        }
    }

    async fn collect(
        pager: &CatalogPager,
        page_size: u32,
    ) -> Vec<Result<CatalogItem, CatalogError>> {
        pager
            .enumerate(
                AccessToken::new("token"),
                CatalogNamespace::new("ns"),
                request(page_size),
                CancellationToken::new(),
            )
            .collect()
            .await
    }

    fn ids(results: Vec<Result<CatalogItem, CatalogError>>) -> Vec<String> {
        results
            .into_iter()
            .map(|r| r.unwrap().id.as_str().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_three_full_pages() {
        let server = MockServer::start().await;
        mount_pages(&server, 30, 10).await;
        let limiter = Arc::new(UnlimitedRateLimiter::new());

        let results = collect(&pager(&server, Arc::clone(&limiter)), 10).await;

        let expected: Vec<_> = (0..30).map(|i| format!("item{i}")).collect();
        assert_eq!(ids(results), expected);
        assert_eq!(limiter.acquired(), 3);
    }

    #[tokio::test]
    async fn test_short_last_page() {
        let server = MockServer::start().await;
        mount_pages(&server, 5, 2).await;
        let limiter = Arc::new(UnlimitedRateLimiter::new());

        let results = collect(&pager(&server, Arc::clone(&limiter)), 2).await;

        assert_eq!(ids(results).len(), 5);
        assert_eq!(limiter.acquired(), 3);
    }

    #[tokio::test]
    async fn test_sends_expected_query_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ns/items"))
            .and(header("authorization", "Bearer token"))
            .and(query_param("start", "0"))
            .and(query_param("count", "500"))
            .and(query_param("country", "US"))
            .and(query_param("locale", "en-US"))
            .and(query_param("includeDLCDetails", "true"))
            .and(query_param("includeMainGameDetails", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 1, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let results = collect(&pager(&server, Arc::new(UnlimitedRateLimiter::new())), 500).await;
        assert_eq!(ids(results), vec!["item0"]);
    }

    #[tokio::test]
    async fn test_empty_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 0, 0)))
            .expect(1)
            .mount(&server)
            .await;

        let results = collect(&pager(&server, Arc::new(UnlimitedRateLimiter::new())), 10).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_progress_terminates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 0, 10)))
            .expect(1)
            .mount(&server)
            .await;

        let results = collect(&pager(&server, Arc::new(UnlimitedRateLimiter::new())), 10).await;
        assert_eq!(results.len(), 1);
        assert!(matches!(
            &results[0],
            Err(CatalogError::NoProgress { start: 0, total: 10, .. })
        ));
    }

    #[tokio::test]
    async fn test_overflowing_count_terminates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "paging": {"count": 1, "start": 0, "total": u64::MAX},
                "elements": [item(0)]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("start", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "paging": {"count": u64::MAX, "start": 1, "total": u64::MAX},
                "elements": [item(1)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = collect(&pager(&server, Arc::new(UnlimitedRateLimiter::new())), 10).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(&results[1], Err(CatalogError::Api { start: 1, .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_single_terminal_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 2, 6)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("start", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let results = collect(&pager(&server, Arc::new(UnlimitedRateLimiter::new())), 2).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(&results[2], Err(CatalogError::Api { start: 2, .. })));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let results = collect(&pager(&server, Arc::new(UnlimitedRateLimiter::new())), 2).await;
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(CatalogError::Api { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let server = MockServer::start().await;
        let limiter = Arc::new(UnlimitedRateLimiter::new());
        let pager = pager(&server, Arc::clone(&limiter));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results: Vec<_> = pager
            .enumerate(
                AccessToken::new("token"),
                CatalogNamespace::new("ns"),
                request(10),
                cancel,
            )
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(CatalogError::Cancelled)));
        assert_eq!(limiter.acquired(), 0);
    }

    #[test]
    fn test_items_url() {
        let pager = CatalogPager::new(HttpClient::new().unwrap(), Arc::new(UnlimitedRateLimiter::new()));
        assert_eq!(
            pager.items_url(&CatalogNamespace::new("fn")),
            "https://catalog-public-service-prod.ol.epicgames.com/catalog/api/shared/namespace/fn/items"
        );
    }
}
