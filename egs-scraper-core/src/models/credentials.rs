//! OAuth credentials and the persisted scraper state.
//!
//! # State File Format
//!
//! ```json
//! {
//!   "outputFolder": "output",
//!   "oAuthClientId": "34a02cf8f4414e29b15921876da36f9a",
//!   "oAuthClientSecret": "...",
//!   "oAuthCredentials": {
//!     "accessToken": "...",
//!     "expiresAt": "2024-01-01T12:00:00Z",
//!     "refreshToken": "...",
//!     "refreshExpiresAt": "2024-01-31T12:00:00Z",
//!     "clientId": "34a02cf8f4414e29b15921876da36f9a"
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ids::{AccessToken, ClientId, ClientSecret, RefreshToken};
use crate::error::CoreError;

// ============================================================================
// OAuth Credentials
// ============================================================================

/// Access/refresh token pair with absolute expiry instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredentials {
    /// Bearer token for API calls.
    pub access_token: AccessToken,
    /// When the access token stops working.
    pub expires_at: DateTime<Utc>,
    /// Token used to mint a new access token.
    pub refresh_token: RefreshToken,
    /// When the refresh token stops working.
    pub refresh_expires_at: DateTime<Utc>,
    /// Client the tokens were issued to.
    pub client_id: ClientId,
}

impl OAuthCredentials {
    /// Builds credentials, rejecting an access token that outlives its
    /// refresh token.
    pub fn new(
        access_token: AccessToken,
        expires_at: DateTime<Utc>,
        refresh_token: RefreshToken,
        refresh_expires_at: DateTime<Utc>,
        client_id: ClientId,
    ) -> Result<Self, CoreError> {
        if expires_at > refresh_expires_at {
            return Err(CoreError::InconsistentExpiry);
        }

        Ok(Self {
            access_token,
            expires_at,
            refresh_token,
            refresh_expires_at,
            client_id,
        })
    }

    /// Returns true if the access token can still be used at `now`.
    pub fn access_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Returns true if the refresh token is past its expiry at `now`.
    pub fn refresh_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.refresh_expires_at
    }
}

/// Body of a successful response from the OAuth token endpoint.
///
/// The endpoint returns more fields (account id, display name, ...); only the
/// ones needed to keep the session alive are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    /// Bearer token.
    pub access_token: AccessToken,
    /// Access token expiry.
    pub expires_at: DateTime<Utc>,
    /// Refresh token.
    pub refresh_token: RefreshToken,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
    /// Client id the token was issued to.
    pub client_id: ClientId,
}

impl TryFrom<OAuthTokenResponse> for OAuthCredentials {
    type Error = CoreError;

    fn try_from(response: OAuthTokenResponse) -> Result<Self, Self::Error> {
        Self::new(
            response.access_token,
            response.expires_at,
            response.refresh_token,
            response.refresh_expires_at,
            response.client_id,
        )
    }
}

// ============================================================================
// Scraper State
// ============================================================================

/// Durable root object, rewritten whenever the token changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperState {
    /// Where namespace and item files are written.
    pub output_folder: PathBuf,
    /// OAuth client id used for refreshes.
    #[serde(rename = "oAuthClientId")]
    pub client_id: ClientId,
    /// OAuth client secret used for refreshes.
    #[serde(rename = "oAuthClientSecret")]
    pub client_secret: ClientSecret,
    /// Last issued credentials, `None` until the first login.
    #[serde(rename = "oAuthCredentials", default)]
    pub credentials: Option<OAuthCredentials>,
}

impl ScraperState {
    /// Creates a state without credentials.
    pub fn new(output_folder: impl Into<PathBuf>, client_id: ClientId, client_secret: ClientSecret) -> Self {
        Self {
            output_folder: output_folder.into(),
            client_id,
            client_secret,
            credentials: None,
        }
    }
}
