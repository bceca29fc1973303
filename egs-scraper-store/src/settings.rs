//! User settings.
//!
//! Everything has a sensible default, so a missing or partial settings file
//! is fine. Unknown keys are ignored.
//!
//! ```json
//! {
//!   "pageSize": 500,
//!   "country": "US",
//!   "rateLimitPermits": 10,
//!   "rateLimitWindowMs": 1000,
//!   "concurrency": 1
//! }
//! ```

use egs_scraper_fetch::{
    catalog::{DEFAULT_COUNTRY, DEFAULT_LOCALE, DEFAULT_PAGE_SIZE},
    http::DEFAULT_TIMEOUT_SECS,
    rate_limit::{DEFAULT_PERMITS, DEFAULT_QUEUE_LIMIT, DEFAULT_WINDOW},
    CatalogRequest, FetchSettings, RateLimiterConfig, CATALOG_BASE_URL, OAUTH_TOKEN_URL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{load_json_or_default, save_json};

/// Storefront page that embeds the namespace mapping.
pub const DEFAULT_DISCOVERY_URL: &str = "https://store.epicgames.com/en-US/p/fortnite";

/// Scraper preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct ScraperSettings {
    /// Catalog endpoint base URL.
    pub catalog_base_url: String,
    /// OAuth token endpoint.
    pub oauth_token_url: String,
    /// Page the namespace mapping is extracted from.
    pub discovery_url: String,
    /// Items per catalog page.
    pub page_size: u32,
    /// Storefront country code.
    pub country: String,
    /// Response locale.
    pub locale: String,
    /// Inline DLC details in catalog responses.
    #[serde(rename = "includeDLCDetails")]
    pub include_dlc_details: bool,
    /// Inline main game details in catalog responses.
    pub include_main_game_details: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Requests allowed per rate limit window.
    pub rate_limit_permits: u32,
    /// Rate limit window length in milliseconds.
    pub rate_limit_window_ms: u64,
    /// Callers allowed to queue for a permit.
    pub rate_limit_queue_limit: usize,
    /// Namespaces scraped at the same time.
    pub concurrency: usize,
    /// Only talk to Epic's production domains.
    pub restrict_domains: bool,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            catalog_base_url: CATALOG_BASE_URL.to_string(),
            oauth_token_url: OAUTH_TOKEN_URL.to_string(),
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            country: DEFAULT_COUNTRY.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            include_dlc_details: true,
            include_main_game_details: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            rate_limit_permits: DEFAULT_PERMITS,
            rate_limit_window_ms: u64::try_from(DEFAULT_WINDOW.as_millis()).unwrap_or(1000),
            rate_limit_queue_limit: DEFAULT_QUEUE_LIMIT,
            concurrency: 1,
            restrict_domains: true,
        }
    }
}

impl ScraperSettings {
    /// Loads settings from `path`, falling back to defaults.
    pub async fn load(path: &Path) -> Self {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "Loading settings");
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
        }
        load_json_or_default(path).await
    }

    /// Saves settings to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Checks values that would make a run impossible.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] naming the first bad value.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.page_size == 0 {
            return Err(StoreError::Config("pageSize must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(StoreError::Config("concurrency must be at least 1".to_string()));
        }
        if self.rate_limit_window_ms == 0 {
            return Err(StoreError::Config(
                "rateLimitWindowMs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Rate limiter parameters.
    pub fn rate_limit(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            permits: self.rate_limit_permits,
            window: Duration::from_millis(self.rate_limit_window_ms),
            queue_limit: self.rate_limit_queue_limit,
        }
    }

    /// Network settings for a [`egs_scraper_fetch::FetchContext`].
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            catalog_base_url: self.catalog_base_url.clone(),
            oauth_token_url: self.oauth_token_url.clone(),
            rate_limit: self.rate_limit(),
            restrict_domains: self.restrict_domains,
        }
    }

    /// Query options for catalog enumeration.
    pub fn catalog_request(&self) -> CatalogRequest {
        CatalogRequest {
            page_size: self.page_size,
            country: self.country.clone(),
            locale: self.locale.clone(),
            include_dlc_details: self.include_dlc_details,
            include_main_game_details: self.include_main_game_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_catalog_defaults() {
        let settings = ScraperSettings::default();
        assert_eq!(settings.catalog_request(), CatalogRequest::default());
        assert_eq!(settings.rate_limit(), RateLimiterConfig::default());
        assert_eq!(settings.fetch_settings(), FetchSettings::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: ScraperSettings =
            serde_json::from_str(r#"{"pageSize": 100, "includeDLCDetails": false, "unknown": 1}"#)
                .unwrap();
        assert_eq!(settings.page_size, 100);
        assert!(!settings.include_dlc_details);
        assert_eq!(settings.country, "US");
        assert_eq!(settings.concurrency, 1);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let settings = ScraperSettings {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(StoreError::Config(_))));

        let settings = ScraperSettings {
            concurrency: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScraperSettings::load(&dir.path().join("settings.json")).await;
        assert_eq!(settings, ScraperSettings::default());
    }
}
