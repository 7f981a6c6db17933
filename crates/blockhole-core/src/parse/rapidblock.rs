//! RapidBlock list formats.

use super::ParseOptions;
use crate::error::{BlockholeError, Result};
use crate::types::{BlockField, DomainBlock, SeverityLevel};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct RapidBlockDocument {
    blocks: BTreeMap<String, RapidBlockEntry>,
}

#[derive(Debug, Deserialize)]
struct RapidBlockEntry {
    #[serde(rename = "isBlocked")]
    is_blocked: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Bare newline separated domains, no header. Every entry is a suspend.
pub(super) fn parse_rapidblock_csv(raw: &str, options: &ParseOptions) -> Result<Vec<DomainBlock>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut blocks = Vec::new();
    for record in reader.records() {
        let record = record?;
        let domain = record.get(0).unwrap_or_default().trim();
        if domain.is_empty() {
            continue;
        }
        blocks.push(capped(DomainBlock::new(domain, SeverityLevel::Suspend), options));
    }
    Ok(blocks)
}

/// `{"blocks": {"<domain>": {"isBlocked": bool, "reason": str, "tags": [...]}}}`
pub(super) fn parse_rapidblock_json(raw: &str, options: &ParseOptions) -> Result<Vec<DomainBlock>> {
    let document: RapidBlockDocument = serde_json::from_str(raw)?;

    document
        .blocks
        .into_iter()
        .map(|(domain, entry)| {
            if domain.is_empty() {
                return Err(BlockholeError::Parse("record has no domain".into()));
            }
            let severity = if entry.is_blocked {
                SeverityLevel::Suspend
            } else {
                SeverityLevel::None
            };
            let mut block = DomainBlock::new(domain, severity);
            if options.import_fields.contains(BlockField::PublicComment) {
                block.public_comment = entry.reason.unwrap_or_default();
            }
            Ok(capped(block, options))
        })
        .collect()
}

fn capped(mut block: DomainBlock, options: &ParseOptions) -> DomainBlock {
    block.severity = block.severity.min(options.max_severity);
    block
}
