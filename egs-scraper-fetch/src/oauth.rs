//! OAuth token endpoint client.
//!
//! Exchanges an authorization code (from the interactive browser login) or a
//! refresh token for a fresh credential pair. A single POST per call, no
//! retries.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use egs_scraper_core::{
    AuthorizationCode, ClientId, ClientSecret, OAuthCredentials, OAuthTokenResponse, RefreshToken,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{HttpError, OAuthError};
use crate::http::HttpClient;

/// Token endpoint.
pub const OAUTH_TOKEN_URL: &str =
    "https://account-public-service-prod.ol.epicgames.com/account/api/oauth/token";

/// Browser login page that redirects to a JSON body holding the
/// authorization code.
pub const OAUTH_AUTHORIZE_URL: &str = "https://www.epicgames.com/id/api/redirect";

/// Client id of the launcher client.
pub const DEFAULT_CLIENT_ID: &str = "34a02cf8f4414e29b15921876da36f9a";

/// Client secret of the launcher client.
pub const DEFAULT_CLIENT_SECRET: &str = "daafbccc737745039dffe53d94fc76cf";

// ============================================================================
// Grant
// ============================================================================

/// What to trade in at the token endpoint.
#[derive(Debug, Clone)]
pub enum TokenGrant {
    /// One-shot code from the browser login.
    AuthorizationCode(AuthorizationCode),
    /// Refresh token from an earlier exchange.
    RefreshToken(RefreshToken),
}

impl TokenGrant {
    /// Form fields sent to the token endpoint.
    fn form(&self) -> [(&'static str, &str); 3] {
        match self {
            Self::AuthorizationCode(code) => [
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("token_type", "eg1"),
            ],
            Self::RefreshToken(token) => [
                ("grant_type", "refresh_token"),
                ("refresh_token", token.as_str()),
                ("token_type", "eg1"),
            ],
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::AuthorizationCode(_) => "authorization_code",
            Self::RefreshToken(_) => "refresh_token",
        }
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Something that can mint credentials from a grant.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Performs one exchange.
    async fn exchange_for_token(
        &self,
        grant: TokenGrant,
        cancel: &CancellationToken,
    ) -> Result<OAuthCredentials, OAuthError>;
}

// ============================================================================
// OAuth Client
// ============================================================================

/// Token endpoint client bound to one OAuth client id/secret pair.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: HttpClient,
    token_url: String,
    client_id: ClientId,
    client_secret: ClientSecret,
}

impl OAuthClient {
    /// Creates a client for the production token endpoint.
    pub fn new(http: HttpClient, client_id: ClientId, client_secret: ClientSecret) -> Self {
        Self {
            http,
            token_url: OAUTH_TOKEN_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Returns the configured client id.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// URL the user opens in a browser to obtain an authorization code.
    pub fn authorization_url(&self) -> String {
        authorization_url(&self.client_id)
    }

    fn basic_auth_header(&self) -> String {
        format!(
            "basic {}",
            encode_client_credentials(&self.client_id, &self.client_secret)
        )
    }
}

/// Builds the browser authorization URL for a client.
pub fn authorization_url(client_id: &ClientId) -> String {
    format!(
        "{OAUTH_AUTHORIZE_URL}?clientId={}&responseType=code",
        client_id.as_str()
    )
}

/// Base64 of `id:secret`, computed over the raw bytes.
pub fn encode_client_credentials(client_id: &ClientId, client_secret: &ClientSecret) -> String {
    let mut raw = Vec::with_capacity(client_id.as_str().len() + 1 + client_secret.as_str().len());
    raw.extend_from_slice(client_id.as_str().as_bytes());
    raw.push(b':');
    raw.extend_from_slice(client_secret.as_str().as_bytes());
    STANDARD.encode(raw)
}

#[async_trait]
impl TokenExchange for OAuthClient {
    #[instrument(skip(self, grant, cancel), fields(grant = grant.kind()))]
    async fn exchange_for_token(
        &self,
        grant: TokenGrant,
        cancel: &CancellationToken,
    ) -> Result<OAuthCredentials, OAuthError> {
        let url = self.token_url.as_str();

        let response = self
            .http
            .post_form_with_auth(url, &grant.form(), &self.basic_auth_header(), cancel)
            .await
            .map_err(|e| match e {
                HttpError::Cancelled => OAuthError::Cancelled,
                other => OAuthError::failure(url, format!("exception contacting endpoint: {other}")),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Token endpoint rejected request");
            return Err(OAuthError::failure(url, format!("HTTP {status}: {body}")));
        }

        let body: OAuthTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::failure(url, format!("failed to decode response: {e}")))?;

        let credentials = OAuthCredentials::try_from(body)
            .map_err(|e| OAuthError::failure(url, e.to_string()))?;

        debug!(expires_at = %credentials.expires_at, "Token exchange succeeded");
        Ok(credentials)
    }
}

// ============================================================================
// Tests
// ============================================================================
