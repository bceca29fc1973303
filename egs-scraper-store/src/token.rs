//! OAuth token lifecycle.
//!
//! [`TokenLifecycleManager`] owns the in-memory [`ScraperState`] and is the
//! only writer of the state file. Deciding whether to refresh, the exchange
//! itself and the write-back all happen under one async lock, so concurrent
//! callers never refresh twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use egs_scraper_core::{AccessToken, AuthorizationCode, OAuthCredentials, ScraperState};
use egs_scraper_fetch::{TokenExchange, TokenGrant};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{AuthError, StoreError};
use crate::state::{load_state, save_state};

// ============================================================================
// Token Provider
// ============================================================================

/// Source of a currently valid access token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token that is valid right now, refreshing if needed.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<AccessToken, AuthError>;
}

// ============================================================================
// Lifecycle Manager
// ============================================================================

/// Hands out valid access tokens and keeps the state file in sync.
pub struct TokenLifecycleManager<E> {
    exchange: E,
    state: Mutex<ScraperState>,
    path: PathBuf,
}

impl<E: TokenExchange> TokenLifecycleManager<E> {
    /// Wraps an already loaded state.
    pub fn new(exchange: E, state: ScraperState, path: impl Into<PathBuf>) -> Self {
        Self {
            exchange,
            state: Mutex::new(state),
            path: path.into(),
        }
    }

    /// Loads the state file at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the state file is missing or unreadable.
    pub async fn load(exchange: E, path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = load_state(&path).await?;
        Ok(Self::new(exchange, state, path))
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the current state.
    pub async fn state(&self) -> ScraperState {
        self.state.lock().await.clone()
    }

    /// Returns a valid access token for `now`.
    ///
    /// Uses the cached token while it is valid. Otherwise trades the refresh
    /// token for a new pair and persists it before returning. Fails without
    /// touching the network when there are no credentials or when the refresh
    /// token has expired too.
    ///
    /// # Errors
    ///
    /// See [`AuthError`]. A failed exchange leaves the stored state as it was.
    #[instrument(skip(self, cancel))]
    pub async fn get_valid_token(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        let mut state = self.state.lock().await;

        let Some(credentials) = state.credentials.as_ref() else {
            return Err(AuthError::MissingCredentials);
        };

        if credentials.access_valid_at(now) {
            debug!(expires_at = %credentials.expires_at, "Using cached access token");
            return Ok(credentials.access_token.clone());
        }

        self.refresh_locked(&mut state, now, cancel).await
    }

    /// Refreshes regardless of whether the access token is still valid.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_valid_token`], minus the cached-token shortcut.
    #[instrument(skip(self, cancel))]
    pub async fn force_refresh(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        let mut state = self.state.lock().await;
        if state.credentials.is_none() {
            return Err(AuthError::MissingCredentials);
        }
        self.refresh_locked(&mut state, now, cancel).await
    }

    /// Trades an authorization code for credentials and persists them,
    /// replacing whatever was stored before.
    ///
    /// # Errors
    ///
    /// Returns the exchange error or the state write error.
    #[instrument(skip(self, code, cancel))]
    pub async fn login(
        &self,
        code: AuthorizationCode,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        let mut state = self.state.lock().await;
        let credentials = self
            .exchange
            .exchange_for_token(TokenGrant::AuthorizationCode(code), cancel)
            .await?;

        info!(expires_at = %credentials.expires_at, "Logged in");
        self.store_locked(&mut state, credentials).await
    }

    async fn refresh_locked(
        &self,
        state: &mut ScraperState,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        let Some(credentials) = state.credentials.as_ref() else {
            return Err(AuthError::MissingCredentials);
        };

        if credentials.refresh_expired_at(now) {
            return Err(AuthError::CredentialsExpired);
        }

        debug!(refresh_expires_at = %credentials.refresh_expires_at, "Refreshing access token");
        let fresh = self
            .exchange
            .exchange_for_token(TokenGrant::RefreshToken(credentials.refresh_token.clone()), cancel)
            .await?;

        info!(expires_at = %fresh.expires_at, "Access token refreshed");
        self.store_locked(state, fresh).await
    }

    async fn store_locked(
        &self,
        state: &mut ScraperState,
        credentials: OAuthCredentials,
    ) -> Result<AccessToken, AuthError> {
        let token = credentials.access_token.clone();
        state.credentials = Some(credentials);
        save_state(&self.path, state).await?;
        Ok(token)
    }
}

#[async_trait]
impl<E: TokenExchange> TokenProvider for TokenLifecycleManager<E> {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<AccessToken, AuthError> {
        self.get_valid_token(Utc::now(), cancel).await
    }
}

impl<E> std::fmt::Debug for TokenLifecycleManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenLifecycleManager")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use egs_scraper_core::{ClientId, ClientSecret, RefreshToken};
    use egs_scraper_fetch::OAuthError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Exchange that counts calls and returns canned credentials.
    struct MockExchange {
        calls: Arc<AtomicUsize>,
        fail: bool,
        issued_at: DateTime<Utc>,
    }

    #[async_trait]
    impl TokenExchange for MockExchange {
        async fn exchange_for_token(
            &self,
            grant: TokenGrant,
            _cancel: &CancellationToken,
        ) -> Result<OAuthCredentials, OAuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(OAuthError::Failure {
                    url: "mock".to_string(),
                    message: "boom".to_string(),
                });
            }
            let access = match grant {
                TokenGrant::AuthorizationCode(_) => "from-code",
                TokenGrant::RefreshToken(_) => "from-refresh",
            };
            Ok(credentials(access, self.issued_at + Duration::hours(2), self.issued_at + Duration::days(30)))
        }
    }

    fn credentials(access: &str, expires: DateTime<Utc>, refresh_expires: DateTime<Utc>) -> OAuthCredentials {
        OAuthCredentials::new(
            AccessToken::new(access),
            expires,
            RefreshToken::new("refresh"),
            refresh_expires,
            ClientId::new("client"),
        )
        .unwrap()
    }

    struct Fixture {
        _dir: TempDir,
        path: PathBuf,
        calls: Arc<AtomicUsize>,
        now: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scraper.state.json");
        Fixture {
            _dir: dir,
            path,
            calls: Arc::new(AtomicUsize::new(0)),
            now: Utc::now(),
        }
    }

    fn manager(
        f: &Fixture,
        stored: Option<OAuthCredentials>,
        fail: bool,
    ) -> TokenLifecycleManager<MockExchange> {
        let mut state = ScraperState::new("out", ClientId::new("client"), ClientSecret::new("secret"));
        state.credentials = stored;
        TokenLifecycleManager::new(
            MockExchange {
                calls: Arc::clone(&f.calls),
                fail,
                issued_at: f.now,
            },
            state,
            &f.path,
        )
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let f = fixture();
        let m = manager(&f, None, false);

        let err = m.get_valid_token(f.now, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_no_network() {
        let f = fixture();
        let stored = credentials("cached", f.now + Duration::hours(1), f.now + Duration::days(1));
        let m = manager(&f, Some(stored), false);

        let token = m.get_valid_token(f.now, &CancellationToken::new()).await.unwrap();
        assert_eq!(token.as_str(), "cached");
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
        assert!(!f.path.exists());
    }

    #[tokio::test]
    async fn test_expired_access_refreshes_once_and_persists() {
        let f = fixture();
        let stored = credentials("old", f.now - Duration::hours(1), f.now + Duration::days(1));
        let m = manager(&f, Some(stored), false);

        let token = m.get_valid_token(f.now, &CancellationToken::new()).await.unwrap();
        assert_eq!(token.as_str(), "from-refresh");
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);

        let on_disk = load_state(&f.path).await.unwrap();
        let creds = on_disk.credentials.unwrap();
        assert_eq!(creds.access_token.as_str(), "from-refresh");
        assert_eq!(creds.expires_at, f.now + Duration::hours(2));

        // Now cached.
        let again = m.get_valid_token(f.now, &CancellationToken::new()).await.unwrap();
        assert_eq!(again.as_str(), "from-refresh");
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_expired_no_network() {
        let f = fixture();
        let stored = credentials("old", f.now - Duration::days(2), f.now - Duration::days(1));
        let m = manager(&f, Some(stored), false);

        let err = m.get_valid_token(f.now, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::CredentialsExpired));
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_state() {
        let f = fixture();
        let stored = credentials("old", f.now - Duration::hours(1), f.now + Duration::days(1));
        let m = manager(&f, Some(stored.clone()), true);

        let err = m.get_valid_token(f.now, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::OAuth(_)));
        assert_eq!(m.state().await.credentials, Some(stored));
        assert!(!f.path.exists());
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_valid_access() {
        let f = fixture();
        let stored = credentials("cached", f.now + Duration::hours(1), f.now + Duration::days(1));
        let m = manager(&f, Some(stored), false);

        let token = m.force_refresh(f.now, &CancellationToken::new()).await.unwrap();
        assert_eq!(token.as_str(), "from-refresh");
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_replaces_credentials() {
        let f = fixture();
        let m = manager(&f, None, false);

        let token = m
            .login(AuthorizationCode::new("code"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(token.as_str(), "from-code");

        let on_disk = load_state(&f.path).await.unwrap();
        assert_eq!(on_disk.credentials.unwrap().access_token.as_str(), "from-code");
    }

    #[tokio::test]
    async fn test_concurrent_callers_refresh_once() {
        let f = fixture();
        let stored = credentials("old", f.now - Duration::hours(1), f.now + Duration::days(1));
        let m = Arc::new(manager(&f, Some(stored), false));
        let now = f.now;

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&m);
                tokio::spawn(async move { m.get_valid_token(now, &CancellationToken::new()).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().as_str(), "from-refresh");
        }

        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }
}
