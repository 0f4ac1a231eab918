//! Command implementations

mod config;
mod paint;
mod rating;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use epcmap_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Paint(args) => paint::execute(args, config_path, &output).await,
        Commands::Rating(args) => rating::execute(args, &output),
        Commands::Config => config::execute(config_path, &output),
    }
}

/// Resolve configuration: defaults, then the file (if any), then the
/// environment, then command-line overrides
pub fn load_config(path: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = path {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    }
    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
