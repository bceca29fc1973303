//! Output formatting for CLI.

mod json;
mod text;

pub use json::{
    JsonFormatter, LoginOutput, NamespacesOutput, ScrapeOutput, StatusOutput, TokenOutput,
};
pub use text::TextFormatter;

use anyhow::Result;
use serde::Serialize;

use crate::{Cli, OutputFormat};

/// Prints `data` as JSON, or as the text produced by `text`.
pub fn emit<T: Serialize>(cli: &Cli, data: &T, text: impl FnOnce(&TextFormatter, &T) -> String) -> Result<()> {
    match cli.format {
        OutputFormat::Text if cli.quiet => {}
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", text(&formatter, data));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(data)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
