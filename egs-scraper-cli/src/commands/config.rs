//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use egs_scraper_store::{default_config_dir, ScraperSettings};
use tracing::info;

use super::{load_settings, settings_path, state_path};
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective settings.
    Show,

    /// Show configuration paths.
    Path,

    /// Write the default settings file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Reset to defaults by deleting the settings file.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init { force } => init_config(cli, *force).await?,
        ConfigAction::Reset => reset_config(cli).await?,
    }
    Ok(ExitCode::Success)
}

async fn show_config(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli).await?;

    match cli.format {
        OutputFormat::Text => {
            println!("egs-scraper Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Catalog URL:     {}", settings.catalog_base_url);
            println!("OAuth token URL: {}", settings.oauth_token_url);
            println!("Discovery URL:   {}", settings.discovery_url);
            println!();
            println!("Page size:       {}", settings.page_size);
            println!("Country/locale:  {} / {}", settings.country, settings.locale);
            println!("DLC details:     {}", settings.include_dlc_details);
            println!("Main game:       {}", settings.include_main_game_details);
            println!();
            println!("Timeout:         {}s", settings.timeout_secs);
            println!(
                "Rate limit:      {} per {}ms, queue {}",
                settings.rate_limit_permits, settings.rate_limit_window_ms, settings.rate_limit_queue_limit
            );
            println!("Concurrency:     {}", settings.concurrency);
            println!("Epic hosts only: {}", settings.restrict_domains);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = settings_path(cli);
    let state_path = state_path(cli);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("State file:    {}", state_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configDir": config_dir.display().to_string(),
                "settingsFile": settings_path.display().to_string(),
                "stateFile": state_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = settings_path(cli);

    if !force && tokio::fs::try_exists(&path).await? {
        anyhow::bail!("{} already exists, pass --force to overwrite", path.display());
    }

    ScraperSettings::default().save(&path).await?;
    println!("Wrote default settings to {}", path.display());

    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let path = settings_path(cli);

    if tokio::fs::try_exists(&path).await? {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
