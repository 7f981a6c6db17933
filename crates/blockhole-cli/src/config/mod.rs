//! Configuration file handling.

use anyhow::{bail, Context as _, Result};
use blockhole::{ListFormat, MergePlan, SeverityLevel, ThresholdType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::args::Cli;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/default/blockhole.conf.toml";

/// Directory for intermediate lists when `savedir` is not set
pub const DEFAULT_SAVEDIR: &str = "/tmp";

/// A blocklist or allowlist published at a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSource {
    pub url: String,

    #[serde(default)]
    pub format: ListFormat,

    /// Blocks from this source are never more severe than this
    #[serde(default)]
    pub max_severity: SeverityLevel,

    /// Fields imported from this source on top of the global ones
    #[serde(default)]
    pub import_fields: Vec<String>,
}

/// An instance whose blocklist is read through its API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSource {
    pub domain: String,

    /// Read the admin API, which needs a token
    #[serde(default)]
    pub admin: bool,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub max_severity: SeverityLevel,

    #[serde(default)]
    pub import_fields: Vec<String>,
}

/// An instance the merged blocklist is pushed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub domain: String,

    /// Token with `admin:read:domain_blocks` and `admin:write:domain_blocks`
    pub token: String,

    /// Highest severity applied to domains that local accounts follow
    #[serde(default = "default_followed_severity")]
    pub max_followed_severity: SeverityLevel,

    #[serde(default)]
    pub override_private_comment: Option<String>,
}

const fn default_followed_severity() -> SeverityLevel {
    SeverityLevel::Silence
}

/// Run configuration, from the config file with command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub blocklist_url_sources: Vec<UrlSource>,
    pub blocklist_instance_sources: Vec<InstanceSource>,
    pub allowlist_url_sources: Vec<UrlSource>,
    pub blocklist_instance_destinations: Vec<Destination>,

    pub save_intermediate: bool,
    pub savedir: Option<PathBuf>,
    pub blocklist_savefile: Option<PathBuf>,
    pub blocklist_auditfile: Option<PathBuf>,

    /// Fields imported on top of `domain` and `severity`
    pub import_fields: Vec<String>,
    /// Fields exported on top of `domain` and `severity`
    pub export_fields: Vec<String>,

    pub mergeplan: MergePlan,
    pub merge_threshold: f64,
    pub merge_threshold_type: ThresholdType,

    pub no_fetch_url: bool,
    pub no_fetch_instance: bool,
    pub no_push_instance: bool,

    /// Seconds between paced destination calls
    pub api_call_interval_secs: Option<f64>,

    /// Only settable on the command line
    #[serde(skip)]
    pub allow_domains: Vec<String>,

    #[serde(skip)]
    pub dryrun: bool,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Load configuration from `path`.
    ///
    /// A missing file is only tolerated at the default location.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            if path == Path::new(DEFAULT_CONFIG_PATH) {
                warn!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            bail!("config file {} not found", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("loading {}", path.display()))
    }

    /// Apply command-line overrides. Flags set on the command line win.
    #[must_use]
    pub fn with_args(mut self, cli: &Cli) -> Self {
        self.no_fetch_url |= cli.no_fetch_url;
        self.no_fetch_instance |= cli.no_fetch_instance;
        self.no_push_instance |= cli.no_push_instance;
        self.save_intermediate |= cli.save_intermediate;
        self.dryrun = cli.dryrun;

        if let Some(path) = &cli.blocklist_savefile {
            self.blocklist_savefile = Some(path.clone());
        }
        if let Some(path) = &cli.blocklist_auditfile {
            self.blocklist_auditfile = Some(path.clone());
        }
        if let Some(dir) = &cli.savedir {
            self.savedir = Some(dir.clone());
        }
        if let Some(plan) = cli.mergeplan {
            self.mergeplan = plan;
        }
        if let Some(threshold) = cli.merge_threshold {
            self.merge_threshold = threshold;
        }
        if let Some(threshold_type) = cli.merge_threshold_type {
            self.merge_threshold_type = threshold_type;
        }
        if !cli.import_fields.is_empty() {
            self.import_fields.clone_from(&cli.import_fields);
        }
        if !cli.export_fields.is_empty() {
            self.export_fields.clone_from(&cli.export_fields);
        }
        self.allow_domains.clone_from(&cli.allow_domains);
        self
    }

    /// Directory intermediate lists are saved in
    pub fn savedir(&self) -> &Path {
        self.savedir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SAVEDIR))
    }
}
