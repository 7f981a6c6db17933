//! CLI argument parsing and run dispatch.

pub mod args;

use anyhow::{bail, Result};
use args::Cli;
use clap::Parser;

use crate::config::Config;
use crate::output;
use crate::pipeline::Pipeline;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    crate::logging::init(cli.loglevel)?;

    // Config file first, then command-line overrides
    let config = Config::load(&cli.config)?.with_args(&cli);

    let outcome = Pipeline::new(config)?.run().await?;
    output::print_summary(&outcome);

    if !outcome.failures.is_empty() {
        let failed: Vec<&str> = outcome
            .failures
            .iter()
            .map(|f| f.destination.as_str())
            .collect();
        bail!("push failed for {}", failed.join(", "));
    }
    Ok(())
}
