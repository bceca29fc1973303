//! Scrape driver.
//!
//! Ties discovery, tokens, the pager and the output layout together:
//!
//! 1. [`CatalogScraper::scrape_namespaces`] renders the storefront page,
//!    extracts the namespace mapping and merges it into `namespaces.json`.
//! 2. [`CatalogScraper::scrape_api`] enumerates every namespace in that file
//!    into `namespaces/<ns>/`, skipping the ones already complete.
//!
//! Token failures and cancellation stop the run. Any other failure only
//! loses the namespace it happened in; its `-tmp` directory stays behind
//! until the next run deletes it.

use egs_scraper_core::{CatalogNamespace, NamespaceMap};
use egs_scraper_fetch::{CatalogError, CatalogPager, CatalogRequest};
use egs_scraper_store::{
    ensure_dir, load_json, merge_namespace_mapping, OutputLayout, PrepareOutcome, TokenProvider,
};
use futures::{stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::discovery::extract_namespaces;
use crate::error::ScrapeError;
use crate::render::PageRenderer;

// ============================================================================
// Outcomes
// ============================================================================

/// What happened to one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceOutcome {
    /// The namespace was complete before this run.
    Skipped,
    /// The namespace was scraped and committed.
    Completed {
        /// Items written.
        items: usize,
    },
}

/// Totals of a [`CatalogScraper::scrape_api`] run.
#[derive(Debug, Default)]
pub struct ScrapeSummary {
    /// Namespaces scraped and committed.
    pub completed: usize,
    /// Items written across all completed namespaces.
    pub items: usize,
    /// Namespaces skipped because they were already complete.
    pub skipped: usize,
    /// Namespaces that failed, with the error message.
    pub failed: Vec<(CatalogNamespace, String)>,
}

// ============================================================================
// Scraper
// ============================================================================

/// Drives discovery and per-namespace scraping.
pub struct CatalogScraper {
    tokens: Arc<dyn TokenProvider>,
    pager: CatalogPager,
    layout: OutputLayout,
    request: CatalogRequest,
    concurrency: usize,
}

impl CatalogScraper {
    /// Creates a scraper that processes one namespace at a time.
    pub fn new(tokens: Arc<dyn TokenProvider>, pager: CatalogPager, layout: OutputLayout) -> Self {
        Self {
            tokens,
            pager,
            layout,
            request: CatalogRequest::default(),
            concurrency: 1,
        }
    }

    /// Sets the catalog query options.
    #[must_use]
    pub fn with_request(mut self, request: CatalogRequest) -> Self {
        self.request = request;
        self
    }

    /// Sets how many namespaces are scraped at once. All of them share the
    /// pager's rate limiter.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Output layout in use.
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Discovers namespaces from `url` and merges them into the mapping
    /// file. Returns the merged mapping.
    ///
    /// # Errors
    ///
    /// Returns error if the page can't be rendered or parsed, or the mapping
    /// file can't be updated.
    #[instrument(skip(self, renderer, cancel))]
    pub async fn scrape_namespaces(
        &self,
        renderer: &dyn PageRenderer,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<NamespaceMap, ScrapeError> {
        let html = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            html = renderer.render_page(url, cancel) => html?,
        };

        let found = extract_namespaces(&html)?;
        info!(count = found.len(), "Discovered namespaces");

        let path = self.layout.mapping_file();
        let merged = merge_namespace_mapping(&path, &found).await?;
        info!("Saved namespaces to \"{}\"", path.display());
        Ok(merged)
    }

    /// Reads the namespace mapping file.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MappingMissing`] if discovery hasn't run yet.
    pub async fn load_namespaces(&self) -> Result<NamespaceMap, ScrapeError> {
        let path = self.layout.mapping_file();
        match load_json(&path).await {
            Ok(map) => Ok(map),
            Err(e) if e.is_not_found() => Err(ScrapeError::MappingMissing(path)),
            Err(e) => Err(e.into()),
        }
    }

    /// Scrapes every namespace of the mapping file, or just `only` when it
    /// is not empty.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error (see [`ScrapeError::is_fatal`]).
    /// Per-namespace failures are logged and reported in the summary.
    #[instrument(skip(self, only, cancel), fields(concurrency = self.concurrency))]
    pub async fn scrape_api(
        &self,
        only: &[CatalogNamespace],
        cancel: &CancellationToken,
    ) -> Result<ScrapeSummary, ScrapeError> {
        let namespaces: Vec<CatalogNamespace> = if only.is_empty() {
            self.load_namespaces().await?.into_keys().collect()
        } else {
            only.to_vec()
        };
        info!(count = namespaces.len(), "Loaded namespaces");

        ensure_dir(&self.layout.namespaces_dir()).await?;

        let mut summary = ScrapeSummary::default();
        let mut results = stream::iter(namespaces)
            .map(|namespace| async move {
                let result = self.scrape_single_namespace(&namespace, cancel).await;
                (namespace, result)
            })
            .buffer_unordered(self.concurrency);

        while let Some((namespace, result)) = results.next().await {
            match result {
                Ok(NamespaceOutcome::Skipped) => summary.skipped += 1,
                Ok(NamespaceOutcome::Completed { items }) => {
                    summary.completed += 1;
                    summary.items += items;
                }
                Err(e) if e.is_fatal() => {
                    error!(namespace = %namespace, error = %e, "Aborting run");
                    return Err(e);
                }
                Err(e) => {
                    error!(namespace = %namespace, error = %e, "Failed to scrape namespace");
                    summary.failed.push((namespace, e.to_string()));
                }
            }
        }

        info!(
            completed = summary.completed,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            items = summary.items,
            "Scrape finished"
        );
        Ok(summary)
    }

    /// Scrapes one namespace into its own directory.
    ///
    /// A namespace whose final directory exists is skipped before any
    /// network access. Items go to the `-tmp` directory, which is renamed
    /// only after the last page arrived.
    ///
    /// # Errors
    ///
    /// Returns error on token, catalog or file system failure. Partial
    /// output is left in the temp directory.
    #[instrument(skip(self, namespace, cancel), fields(namespace = %namespace))]
    pub async fn scrape_single_namespace(
        &self,
        namespace: &CatalogNamespace,
        cancel: &CancellationToken,
    ) -> Result<NamespaceOutcome, ScrapeError> {
        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let mut writer = match self.layout.prepare_namespace(namespace).await? {
            PrepareOutcome::AlreadyComplete(_) => return Ok(NamespaceOutcome::Skipped),
            PrepareOutcome::Ready(writer) => writer,
        };

        let token = self.tokens.access_token(cancel).await?;

        let items = self
            .pager
            .enumerate(token, namespace.clone(), self.request.clone(), cancel.clone());
        futures::pin_mut!(items);

        while let Some(item) = items.next().await {
            let item = match item {
                Ok(item) => item,
                Err(CatalogError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(source) => {
                    return Err(ScrapeError::Catalog {
                        namespace: namespace.clone(),
                        source,
                    });
                }
            };

            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }
            writer.write_item(&item).await?;
        }

        let written = writer.written();
        writer.commit().await?;
        info!("Finished scraping namespace \"{}\"", namespace);

        Ok(NamespaceOutcome::Completed { items: written })
    }
}

impl std::fmt::Debug for CatalogScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogScraper")
            .field("layout", &self.layout)
            .field("request", &self.request)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
