//! Namespaces command - discover namespaces from a store page.

use anyhow::Result;
use clap::Args;
use egs_scraper_catalog::{CatalogScraper, FileRenderer, HttpRenderer, PageRenderer};
use egs_scraper_store::OutputLayout;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{fetch_context, load_settings, token_manager};
use crate::output::{emit, NamespacesOutput, TextFormatter};
use crate::{Cli, ExitCode};

/// Arguments for the namespaces command.
#[derive(Args)]
pub struct NamespacesArgs {
    /// Read the page from a file saved by a browser instead of fetching it.
    #[arg(long, conflicts_with = "url", value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Store page to fetch (defaults to the discovery URL from settings).
    #[arg(long)]
    pub url: Option<String>,
}

/// Runs the namespaces command.
pub async fn run(args: &NamespacesArgs, cli: &Cli, cancel: &CancellationToken) -> Result<ExitCode> {
    let settings = load_settings(cli).await?;
    let ctx = fetch_context(&settings)?;
    let tokens = token_manager(cli, &ctx).await?;
    let layout = OutputLayout::new(tokens.state().await.output_folder);

    let url = args.url.clone().unwrap_or_else(|| settings.discovery_url.clone());
    let renderer: Box<dyn PageRenderer> = match &args.html {
        Some(path) => Box::new(FileRenderer::new(path)),
        None => Box::new(HttpRenderer::new(ctx.http.clone())),
    };

    let scraper = CatalogScraper::new(Arc::new(tokens), ctx.pager(), layout);
    let mapping = scraper.scrape_namespaces(renderer.as_ref(), &url, cancel).await?;

    let output = NamespacesOutput {
        mapping_file: scraper.layout().mapping_file().display().to_string(),
        namespaces: mapping.len(),
    };
    emit(cli, &output, TextFormatter::format_namespaces)?;
    Ok(ExitCode::Success)
}
