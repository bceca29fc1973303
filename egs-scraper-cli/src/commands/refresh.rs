//! Refresh command - trade the refresh token for a new pair.

use anyhow::Result;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{fetch_context, load_settings, token_manager};
use crate::output::{emit, TokenOutput};
use crate::{Cli, ExitCode};

/// Runs the refresh command.
pub async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<ExitCode> {
    let settings = load_settings(cli).await?;
    let ctx = fetch_context(&settings)?;
    let tokens = token_manager(cli, &ctx).await?;

    let now = Utc::now();
    tokens.force_refresh(now, cancel).await?;
    info!("OAuth token refreshed");

    if let Some(credentials) = tokens.state().await.credentials {
        let output = TokenOutput::new(&credentials, now);
        emit(cli, &output, |_, token| {
            format!("Access token valid until {}", token.expires_at.to_rfc3339())
        })?;
    }
    Ok(ExitCode::Success)
}
