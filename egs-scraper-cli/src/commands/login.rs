//! Login command - trade an authorization code for tokens.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use egs_scraper_core::{AuthorizationCode, ClientId, ClientSecret, ScraperState};
use egs_scraper_fetch::{authorization_url, DEFAULT_CLIENT_ID, DEFAULT_CLIENT_SECRET};
use egs_scraper_store::{load_state_if_exists, save_state, TokenLifecycleManager};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{fetch_context, load_settings, state_path};
use crate::output::{emit, LoginOutput, TextFormatter, TokenOutput};
use crate::{Cli, ExitCode};

/// Output folder used when neither the state file nor `--output` names one.
pub const DEFAULT_OUTPUT_FOLDER: &str = "output";

/// Arguments for the login command.
#[derive(Args, Default)]
pub struct LoginArgs {
    /// Authorization code from the redirect page. Without it, the URL that
    /// hands out a code is printed.
    #[arg(long)]
    pub code: Option<String>,

    /// OAuth client id (defaults to the launcher client).
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth client secret (defaults to the launcher client).
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Folder receiving namespaces.json and the item files.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli, cancel: &CancellationToken) -> Result<ExitCode> {
    let path = state_path(cli);
    let state = apply_args(load_state_if_exists(&path).await?, args);

    let Some(code) = &args.code else {
        save_state(&path, &state).await?;
        let output = LoginOutput {
            state_file: path.display().to_string(),
            output_folder: state.output_folder.display().to_string(),
            client_id: state.client_id.to_string(),
            authorization_url: Some(authorization_url(&state.client_id)),
            token: None,
        };
        emit(cli, &output, TextFormatter::format_login)?;
        return Ok(ExitCode::Success);
    };

    let settings = load_settings(cli).await?;
    let ctx = fetch_context(&settings)?;
    let oauth = ctx.oauth_client(state.client_id.clone(), state.client_secret.clone());
    let tokens = TokenLifecycleManager::new(oauth, state, &path);

    tokens.login(AuthorizationCode::new(code.as_str()), cancel).await?;

    let state = tokens.state().await;
    info!(path = %path.display(), "State exported");

    let output = LoginOutput {
        state_file: path.display().to_string(),
        output_folder: state.output_folder.display().to_string(),
        client_id: state.client_id.to_string(),
        authorization_url: None,
        token: state
            .credentials
            .as_ref()
            .map(|c| TokenOutput::new(c, Utc::now())),
    };
    emit(cli, &output, TextFormatter::format_login)?;
    Ok(ExitCode::Success)
}

/// Merges command-line overrides into the stored state, or starts a new
/// one. Switching clients drops credentials issued to the old one.
fn apply_args(existing: Option<ScraperState>, args: &LoginArgs) -> ScraperState {
    let mut state = existing.unwrap_or_else(|| {
        ScraperState::new(
            DEFAULT_OUTPUT_FOLDER,
            ClientId::new(DEFAULT_CLIENT_ID),
            ClientSecret::new(DEFAULT_CLIENT_SECRET),
        )
    });

    if let Some(id) = &args.client_id {
        let id = ClientId::new(id.as_str());
        if id != state.client_id {
            state.credentials = None;
        }
        state.client_id = id;
    }
    if let Some(secret) = &args.client_secret {
        state.client_secret = ClientSecret::new(secret.as_str());
    }
    if let Some(output) = &args.output {
        state.output_folder.clone_from(output);
    }
    state
}
