//! Silex - A folder-based static site generator.

mod build;
mod cli;
mod compiler;
mod config;
mod context;
mod data;
mod engine;
mod errors;
mod generator;
mod logger;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use std::path::Path;
use std::process::ExitCode;
use watch::watch_for_changes_blocking;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.is_watch() {
        watch_for_changes_blocking(&config)?;
        Ok(ExitCode::SUCCESS)
    } else {
        let errors = build_site(&config)?;
        if errors.is_empty() {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is not an error; the built-in defaults apply
/// and the CLI flags override them as usual.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
