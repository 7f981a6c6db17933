//! Merge engine: combine per-source blocklists into one.

use blockhole_core::{BlockAudit, BlockAuditList, Blocklist, BlockholeError, DomainBlock, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info};

/// Origin label of the merged blocklist
pub const MERGED_ORIGIN: &str = "merged";

const COMMENT_SEPARATOR: &str = ", ";

/// How conflicting records for one domain are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePlan {
    /// Keep the most severe judgement
    #[default]
    Max,
    /// Keep the least severe judgement
    Min,
}

impl FromStr for MergePlan {
    type Err = BlockholeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(BlockholeError::UnsupportedMergePlan(other.to_string())),
        }
    }
}

impl std::fmt::Display for MergePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Max => "max",
            Self::Min => "min",
        })
    }
}

/// Unit of the merge threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    /// Number of sources mentioning the domain
    #[default]
    Count,
    /// Percentage of sources mentioning the domain
    Pct,
}

impl FromStr for ThresholdType {
    type Err = BlockholeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count" => Ok(Self::Count),
            "pct" => Ok(Self::Pct),
            other => Err(BlockholeError::UnsupportedThresholdType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Count => "count",
            Self::Pct => "pct",
        })
    }
}

/// Merge settings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MergeOptions {
    pub plan: MergePlan,
    /// Minimum mentions a domain needs to be kept. 0 keeps everything.
    pub threshold: f64,
    pub threshold_type: ThresholdType,
}

impl MergeOptions {
    #[must_use]
    pub fn new(plan: MergePlan) -> Self {
        Self {
            plan,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn threshold(mut self, threshold: f64, threshold_type: ThresholdType) -> Self {
        self.threshold = threshold;
        self.threshold_type = threshold_type;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn admits(&self, audit: &BlockAudit) -> bool {
        match self.threshold_type {
            ThresholdType::Count => audit.count as f64 >= self.threshold,
            ThresholdType::Pct => audit.percent >= self.threshold,
        }
    }
}

/// Merge `blocklists` into a single list.
///
/// Records for obfuscated domains are skipped. Every remaining domain gets an
/// entry in `audit`, whether or not it passes the threshold. Records for a
/// domain are folded in the order of `blocklists`.
pub fn merge_blocklists(
    blocklists: &[Blocklist],
    options: &MergeOptions,
    mut audit: Option<&mut BlockAuditList>,
) -> Blocklist {
    let mut mentions: BTreeMap<&str, Vec<&DomainBlock>> = BTreeMap::new();
    for blocklist in blocklists {
        debug!(origin = %blocklist.origin, blocks = blocklist.len(), "merging blocklist");
        for block in blocklist {
            if block.is_obfuscated() {
                debug!(
                    domain = %block.domain,
                    origin = %blocklist.origin,
                    "skipping obfuscated domain"
                );
                continue;
            }
            mentions.entry(block.domain.as_str()).or_default().push(block);
        }
    }

    let total = blocklists.len();
    let mut merged = Blocklist::new(MERGED_ORIGIN);

    for (domain, records) in mentions {
        let entry = BlockAudit::new(domain, records.len(), total);
        let admitted = options.admits(&entry);
        if let Some(audit) = audit.as_deref_mut() {
            audit.insert(entry);
        }
        if !admitted {
            debug!(domain, mentions = records.len(), "below merge threshold");
            continue;
        }

        let mut records = records.into_iter();
        let Some(first) = records.next() else {
            continue;
        };
        let mut seed = first.clone();
        seed.id = None;
        merged.insert(records.fold(seed, |acc, next| apply_mergeplan(&acc, next, options.plan)));
    }

    info!(sources = total, blocks = merged.len(), plan = %options.plan, "merged blocklists");
    merged
}

/// Combine two records for the same domain.
#[must_use]
pub fn apply_mergeplan(old: &DomainBlock, new: &DomainBlock, plan: MergePlan) -> DomainBlock {
    let (severity, reject_media, reject_reports, obfuscate) = match plan {
        MergePlan::Max => (
            old.severity.max(new.severity),
            old.reject_media || new.reject_media,
            old.reject_reports || new.reject_reports,
            old.obfuscate || new.obfuscate,
        ),
        MergePlan::Min => (
            old.severity.min(new.severity),
            old.reject_media && new.reject_media,
            old.reject_reports && new.reject_reports,
            old.obfuscate && new.obfuscate,
        ),
    };

    DomainBlock {
        domain: old.domain.clone(),
        severity,
        public_comment: merge_comments(old.public_comment.as_str(), new.public_comment.as_str()),
        private_comment: merge_comments(old.private_comment.as_str(), new.private_comment.as_str()),
        reject_media,
        reject_reports,
        obfuscate,
        id: None,
    }
}

/// Merge two comma-separated comments, appending only tokens `old` lacks.
///
/// Absent and empty comments are treated alike, so both `&str` and
/// `Option<&str>` are accepted.
#[must_use]
pub fn merge_comments<'a>(
    old: impl Into<Option<&'a str>>,
    new: impl Into<Option<&'a str>>,
) -> String {
    let old = old.into().unwrap_or_default();
    let new = new.into().unwrap_or_default();

    match (old.is_empty(), new.is_empty()) {
        (true, true) => return String::new(),
        (false, true) => return old.to_string(),
        (true, false) => return new.to_string(),
        (false, false) if old == new => return old.to_string(),
        (false, false) => {}
    }

    let old_tokens: Vec<&str> = old.split(COMMENT_SEPARATOR).filter(|t| !t.is_empty()).collect();
    let novel = new
        .split(COMMENT_SEPARATOR)
        .filter(|t| !t.is_empty() && !old_tokens.contains(t));

    old_tokens
        .iter()
        .copied()
        .chain(novel)
        .collect::<Vec<_>>()
        .join(COMMENT_SEPARATOR)
}
