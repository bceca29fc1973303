// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! egs-scraper CLI - incremental Epic Games Store catalog scraping.
//!
//! # Examples
//!
//! ```bash
//! # Print the URL that hands out an authorization code
//! egs-scraper login
//!
//! # Trade the code for tokens and pick an output folder
//! egs-scraper login --code 0123abcd --output ./catalog
//!
//! # Discover namespaces from a page saved by a browser
//! egs-scraper namespaces --html fortnite.html
//!
//! # Scrape everything that isn't finished yet
//! egs-scraper scrape
//!
//! # Scrape two namespaces, three at a time
//! egs-scraper scrape --namespace fn --namespace ue --concurrency 3
//!
//! # Token and progress overview as JSON
//! egs-scraper status --format json --pretty
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use egs_scraper_catalog::ScrapeError;
use egs_scraper_store::AuthError;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{config, login, namespaces, refresh, scrape, status};

// ============================================================================
// CLI Definition
// ============================================================================

/// egs-scraper CLI - Epic Games Store catalog scraper.
#[derive(Parser)]
#[command(name = "egs-scraper")]
#[command(about = "Incremental, resumable Epic Games Store catalog scraper")]
#[command(long_about = r#"
egs-scraper mirrors the Epic Games Store catalog to disk.

Workflow:
  1. login        Trade an authorization code for OAuth tokens
  2. namespaces   Discover catalog namespaces from a store page
  3. scrape       Write every item of every namespace as JSON

Finished namespaces are skipped, so an interrupted scrape picks up
where it stopped.

Examples:
  egs-scraper login                        # Print the authorization URL
  egs-scraper login --code <code>          # Store tokens
  egs-scraper namespaces --html page.html  # Discover namespaces
  egs-scraper scrape                       # Scrape pending namespaces
  egs-scraper status                       # Tokens and progress
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// State file with OAuth client and tokens.
    #[arg(long, global = true, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Settings file.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in with an authorization code, or print where to get one.
    Login(login::LoginArgs),

    /// Refresh the stored access token.
    Refresh,

    /// Discover namespaces and merge them into namespaces.json.
    #[command(visible_alias = "ns")]
    Namespaces(namespaces::NamespacesArgs),

    /// Scrape catalog items of discovered namespaces.
    #[command(visible_alias = "s")]
    Scrape(scrape::ScrapeArgs),

    /// Show token validity and scrape progress.
    Status,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No usable credentials, run `login`.
    AuthRequired = 2,
    /// The run finished but some namespaces failed.
    PartialFailure = 3,
    /// Interrupted with Ctrl+C.
    Cancelled = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if let Some(e) = error.downcast_ref::<ScrapeError>() {
            return match e {
                ScrapeError::Auth(auth) => Self::for_auth(auth),
                ScrapeError::Cancelled => ExitCode::Cancelled,
                _ => ExitCode::Error,
            };
        }
        if let Some(auth) = error.downcast_ref::<AuthError>() {
            return Self::for_auth(auth);
        }
        ExitCode::Error
    }

    /// A state file that can't be written is not a login problem.
    fn for_auth(error: &AuthError) -> Self {
        match error {
            AuthError::State(_) => ExitCode::Error,
            _ => ExitCode::AuthRequired,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("egs_scraper=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("egs_scraper=info,warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let cancel = commands::shutdown_token();

    let result = match &cli.command {
        Commands::Login(args) => login::run(args, &cli, &cancel).await,
        Commands::Refresh => refresh::run(&cli, &cancel).await,
        Commands::Namespaces(args) => namespaces::run(args, &cli, &cancel).await,
        Commands::Scrape(args) => scrape::run(args, &cli, &cancel).await,
        Commands::Status => status::run(&cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };

    if code != ExitCode::Success {
        std::process::exit(code as i32);
    }

    Ok(())
}
