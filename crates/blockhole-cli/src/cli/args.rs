//! Command-line argument definitions using clap.

use blockhole::{MergePlan, ThresholdType};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Merge domain blocklists from many sources and push them to Mastodon instances
///
/// Sources, allowlists and destinations are read from the config file.
/// Options given here override the matching config keys.
#[derive(Parser, Debug)]
#[command(name = "blockhole")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Save the merged blocklist to a local file (.json for JSON, otherwise CSV)
    #[arg(short = 'o', long = "outfile")]
    pub blocklist_savefile: Option<PathBuf>,

    /// Save each fetched blocklist to the save directory
    #[arg(short = 'S', long)]
    pub save_intermediate: bool,

    /// Directory for intermediate blocklists
    #[arg(short = 'D', long)]
    pub savedir: Option<PathBuf>,

    /// How to combine conflicting blocks: max or min
    #[arg(short, long)]
    pub mergeplan: Option<MergePlan>,

    /// Only keep domains mentioned by at least this many sources (or percent)
    #[arg(long)]
    pub merge_threshold: Option<f64>,

    /// Unit of --merge-threshold: count or pct
    #[arg(long)]
    pub merge_threshold_type: Option<ThresholdType>,

    /// Extra block field to import (repeatable)
    #[arg(short = 'I', long = "import-field")]
    pub import_fields: Vec<String>,

    /// Extra block field to export (repeatable)
    #[arg(short = 'E', long = "export-field")]
    pub export_fields: Vec<String>,

    /// Allow this domain, removing any merged block for it (repeatable)
    #[arg(short = 'A', long = "allow")]
    pub allow_domains: Vec<String>,

    /// Save per-domain mention counts to this CSV file
    #[arg(long = "save-audit", value_name = "FILE")]
    pub blocklist_auditfile: Option<PathBuf>,

    /// Don't fetch from URLs, even if configured
    #[arg(long)]
    pub no_fetch_url: bool,

    /// Don't fetch from instances, even if configured
    #[arg(long)]
    pub no_fetch_instance: bool,

    /// Don't push to instances, even if configured
    #[arg(long)]
    pub no_push_instance: bool,

    /// Log level (RUST_LOG is used when unset)
    #[arg(long, value_enum)]
    pub loglevel: Option<LogLevel>,

    /// Show what would change on each destination without changing it
    #[arg(long)]
    pub dryrun: bool,
}

/// Log output levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by the tracing filter
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_command() {
        let cli = Cli::try_parse_from(["blockhole"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(cli.mergeplan.is_none());
        assert!(cli.blocklist_savefile.is_none());
        assert!(!cli.save_intermediate);
        assert!(cli.savedir.is_none());
        assert!(cli.import_fields.is_empty());
        assert!(cli.export_fields.is_empty());
        assert!(!cli.no_fetch_url);
        assert!(!cli.no_fetch_instance);
        assert!(!cli.no_push_instance);
        assert!(!cli.dryrun);
        assert!(cli.loglevel.is_none());
    }

    #[test]
    fn test_mergeplan() {
        let cli = Cli::try_parse_from(["blockhole", "-m", "min"]).unwrap();
        assert_eq!(cli.mergeplan, Some(MergePlan::Min));
        assert!(Cli::try_parse_from(["blockhole", "-m", "avg"]).is_err());
    }

    #[test]
    fn test_repeated_flags() {
        let cli = Cli::try_parse_from([
            "blockhole", "-A", "example.org", "-A", "example2.org", "-I", "public_comment",
            "-I", "reject_media", "-E", "public_comment",
        ])
        .unwrap();
        assert_eq!(cli.allow_domains, ["example.org", "example2.org"]);
        assert_eq!(cli.import_fields, ["public_comment", "reject_media"]);
        assert_eq!(cli.export_fields, ["public_comment"]);
    }

    #[test]
    fn test_threshold_and_loglevel() {
        let cli = Cli::try_parse_from([
            "blockhole", "--merge-threshold", "55", "--merge-threshold-type", "pct",
            "--loglevel", "warning", "--dryrun",
        ])
        .unwrap();
        assert_eq!(cli.merge_threshold, Some(55.0));
        assert_eq!(cli.merge_threshold_type, Some(ThresholdType::Pct));
        assert_eq!(cli.loglevel.map(LogLevel::directive), Some("warn"));
        assert!(cli.dryrun);
    }
}
