//! Log output setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::args::LogLevel;

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber, writing to stderr.
///
/// An explicit `level` wins over `RUST_LOG`.
pub fn init(level: Option<LogLevel>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level.directive())?,
        None => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to set up logging: {e}"))
}
