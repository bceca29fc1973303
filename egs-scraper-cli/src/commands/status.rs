//! Status command - token validity and scrape progress.

use anyhow::Result;
use chrono::Utc;
use egs_scraper_core::NamespaceMap;
use egs_scraper_store::{load_json, load_state, OutputLayout};

use super::state_path;
use crate::output::{emit, StatusOutput, TokenOutput};
use crate::{Cli, ExitCode};

/// Runs the status command. Reads local files only.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let path = state_path(cli);
    let state = load_state(&path).await?;
    let layout = OutputLayout::new(&state.output_folder);
    let now = Utc::now();

    let namespaces = match load_json::<NamespaceMap>(&layout.mapping_file()).await {
        Ok(map) => Some(map.len()),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e.into()),
    };

    let output = StatusOutput {
        state_file: path.display().to_string(),
        output_folder: state.output_folder.display().to_string(),
        client_id: state.client_id.to_string(),
        token: state.credentials.as_ref().map(|c| TokenOutput::new(c, now)),
        namespaces,
        completed: layout.completed_namespaces().await?.len(),
        interrupted: layout
            .pending_namespaces()
            .await?
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    emit(cli, &output, |formatter, status| formatter.format_status(status, now))?;
    Ok(ExitCode::Success)
}
