//! Scrape command - write catalog items of discovered namespaces.

use anyhow::Result;
use clap::Args;
use egs_scraper_catalog::CatalogScraper;
use egs_scraper_core::CatalogNamespace;
use egs_scraper_store::OutputLayout;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{fetch_context, load_settings, token_manager};
use crate::output::{emit, ScrapeOutput, TextFormatter};
use crate::{Cli, ExitCode};

/// Arguments for the scrape command.
#[derive(Args, Default)]
pub struct ScrapeArgs {
    /// Only scrape these namespaces (repeatable). Defaults to every
    /// namespace in namespaces.json.
    #[arg(long, short)]
    pub namespace: Vec<String>,

    /// Namespaces scraped at once (overrides settings).
    #[arg(long, short)]
    pub concurrency: Option<usize>,

    /// Catalog page size (overrides settings).
    #[arg(long)]
    pub page_size: Option<u32>,
}

/// Runs the scrape command.
pub async fn run(args: &ScrapeArgs, cli: &Cli, cancel: &CancellationToken) -> Result<ExitCode> {
    let mut settings = load_settings(cli).await?;
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    settings.validate()?;

    let ctx = fetch_context(&settings)?;
    let tokens = token_manager(cli, &ctx).await?;
    let layout = OutputLayout::new(tokens.state().await.output_folder);

    let scraper = CatalogScraper::new(Arc::new(tokens), ctx.pager(), layout)
        .with_request(settings.catalog_request())
        .with_concurrency(settings.concurrency);

    let only: Vec<CatalogNamespace> = args
        .namespace
        .iter()
        .map(|ns| CatalogNamespace::new(ns.as_str()))
        .collect();
    let summary = scraper.scrape_api(&only, cancel).await?;

    let output = ScrapeOutput::from(&summary);
    emit(cli, &output, TextFormatter::format_scrape)?;

    if summary.failed.is_empty() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialFailure)
    }
}
