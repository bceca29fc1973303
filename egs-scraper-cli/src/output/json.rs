//! JSON output formatting.
//!
//! The output structs double as the data model of the text formatter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use egs_scraper_catalog::ScrapeSummary;
use egs_scraper_core::OAuthCredentials;
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// Result of `login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    pub state_file: String,
    pub output_folder: String,
    pub client_id: String,
    /// Set when no code was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenOutput>,
}

/// Token validity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOutput {
    pub access_valid: bool,
    #[serde(serialize_with = "serialize_datetime")]
    pub expires_at: DateTime<Utc>,
    pub refresh_valid: bool,
    #[serde(serialize_with = "serialize_datetime")]
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenOutput {
    /// Describes `credentials` as seen at `now`.
    pub fn new(credentials: &OAuthCredentials, now: DateTime<Utc>) -> Self {
        Self {
            access_valid: credentials.access_valid_at(now),
            expires_at: credentials.expires_at,
            refresh_valid: !credentials.refresh_expired_at(now),
            refresh_expires_at: credentials.refresh_expires_at,
        }
    }
}

/// Result of `status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub state_file: String,
    pub output_folder: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenOutput>,
    /// Namespaces in the mapping file, `None` before discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<usize>,
    pub completed: usize,
    /// Namespaces with a leftover temp directory.
    pub interrupted: Vec<String>,
}

impl StatusOutput {
    /// Mapped namespaces without a final directory.
    pub fn remaining(&self) -> Option<usize> {
        self.namespaces.map(|total| total.saturating_sub(self.completed))
    }
}

/// Result of `namespaces`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespacesOutput {
    pub mapping_file: String,
    pub namespaces: usize,
}

/// Result of `scrape`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutput {
    pub completed: usize,
    pub skipped: usize,
    pub items: usize,
    pub failed: Vec<FailureOutput>,
}

/// One failed namespace.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureOutput {
    pub namespace: String,
    pub error: String,
}

impl From<&ScrapeSummary> for ScrapeOutput {
    fn from(summary: &ScrapeSummary) -> Self {
        Self {
            completed: summary.completed,
            skipped: summary.skipped,
            items: summary.items,
            failed: summary
                .failed
                .iter()
                .map(|(namespace, error)| FailureOutput {
                    namespace: namespace.to_string(),
                    error: error.clone(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
