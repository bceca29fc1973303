//! Page renderers.
//!
//! Discovery only needs the HTML of one storefront page. How that HTML is
//! obtained is pluggable: a plain GET, or a page saved from a real browser
//! when the storefront refuses non-browser clients.

use async_trait::async_trait;
use egs_scraper_fetch::HttpClient;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::RenderError;

/// Produces the HTML of a page.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Returns the HTML for `url`.
    async fn render_page(&self, url: &str, cancel: &CancellationToken) -> Result<String, RenderError>;
}

/// Serves a page saved to disk, whatever URL is asked for.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
}

impl FileRenderer {
    /// Creates a renderer backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageRenderer for FileRenderer {
    #[instrument(skip(self, _cancel), fields(path = %self.path.display()))]
    async fn render_page(&self, url: &str, _cancel: &CancellationToken) -> Result<String, RenderError> {
        debug!("Reading saved page");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RenderError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Fetches the page with a plain GET request.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    http: HttpClient,
}

impl HttpRenderer {
    /// Creates a renderer using `http`.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render_page(&self, url: &str, cancel: &CancellationToken) -> Result<String, RenderError> {
        Ok(self.http.get_text(url, cancel).await?)
    }
}
