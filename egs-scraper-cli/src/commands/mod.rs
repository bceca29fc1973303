//! CLI command implementations.

pub mod config;
pub mod login;
pub mod namespaces;
pub mod refresh;
pub mod scrape;
pub mod status;

use anyhow::{Context, Result};
use egs_scraper_fetch::{FetchContext, OAuthClient};
use egs_scraper_store::{
    default_settings_path, default_state_path, load_state, ScraperSettings, TokenLifecycleManager,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::Cli;

/// Returns a token cancelled on the first Ctrl+C. A second Ctrl+C exits
/// right away.
pub fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping after the current request");
            handle.cancel();

            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nForce quit requested, exiting immediately...");
                std::process::exit(crate::ExitCode::Cancelled as i32);
            }
        }
    });

    cancel
}

/// State file path from `--state`, or the default.
pub fn state_path(cli: &Cli) -> PathBuf {
    cli.state.clone().unwrap_or_else(default_state_path)
}

/// Settings file path from `--settings`, or the default.
pub fn settings_path(cli: &Cli) -> PathBuf {
    cli.settings.clone().unwrap_or_else(default_settings_path)
}

/// Loads and validates settings.
pub async fn load_settings(cli: &Cli) -> Result<ScraperSettings> {
    let path = settings_path(cli);
    let settings = ScraperSettings::load(&path).await;
    settings
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(settings)
}

/// Builds the shared HTTP client and rate limiter.
pub fn fetch_context(settings: &ScraperSettings) -> Result<FetchContext> {
    FetchContext::with_settings(settings.fetch_settings()).context("Failed to create HTTP client")
}

/// Loads the state file and wraps it in a token manager using the stored
/// OAuth client.
pub async fn token_manager(
    cli: &Cli,
    ctx: &FetchContext,
) -> Result<TokenLifecycleManager<OAuthClient>> {
    let path = state_path(cli);
    let state = load_state(&path)
        .await
        .with_context(|| format!("Unable to import state from {}, run `egs-scraper login` first", path.display()))?;

    let oauth = ctx.oauth_client(state.client_id.clone(), state.client_secret.clone());
    Ok(TokenLifecycleManager::new(oauth, state, path))
}
