use super::block::DomainBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A set of domain blocks from one origin, keyed by domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    /// Where the list came from (URL, instance, or `merged`)
    pub origin: String,

    blocks: BTreeMap<String, DomainBlock>,
}

impl Blocklist {
    /// Create an empty list
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            blocks: BTreeMap::new(),
        }
    }

    /// Create a list from blocks. A later block for the same domain replaces an earlier one.
    #[must_use]
    pub fn from_blocks<I>(origin: impl Into<String>, blocks: I) -> Self
    where
        I: IntoIterator<Item = DomainBlock>,
    {
        let mut list = Self::new(origin);
        list.extend(blocks);
        list
    }

    /// Insert a block, returning the block it replaced
    pub fn insert(&mut self, block: DomainBlock) -> Option<DomainBlock> {
        self.blocks.insert(block.domain.clone(), block)
    }

    /// Remove a block by exact domain
    pub fn remove(&mut self, domain: &str) -> Option<DomainBlock> {
        self.blocks.remove(domain)
    }

    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&DomainBlock> {
        self.blocks.get(domain)
    }

    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.blocks.contains_key(domain)
    }

    /// Domains in sorted order
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Blocks in domain order
    pub fn iter(&self) -> impl Iterator<Item = &DomainBlock> {
        self.blocks.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Extend<DomainBlock> for Blocklist {
    fn extend<I: IntoIterator<Item = DomainBlock>>(&mut self, iter: I) {
        for block in iter {
            self.insert(block);
        }
    }
}

impl IntoIterator for Blocklist {
    type Item = DomainBlock;
    type IntoIter = std::collections::btree_map::IntoValues<String, DomainBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_values()
    }
}

impl<'a> IntoIterator for &'a Blocklist {
    type Item = &'a DomainBlock;
    type IntoIter = std::collections::btree_map::Values<'a, String, DomainBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.values()
    }
}

/// How often a domain was mentioned across the merged sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAudit {
    /// Mentioned domain
    pub domain: String,

    /// Number of sources that list the domain
    pub count: usize,

    /// `count` as a percentage of all sources
    pub percent: f64,
}

impl BlockAudit {
    /// Audit entry for a domain seen in `count` of `total` sources
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(domain: impl Into<String>, count: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        Self {
            domain: domain.into(),
            count,
            percent,
        }
    }
}

/// Audit entries keyed by domain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockAuditList {
    /// Label for the run the audit belongs to
    pub origin: String,

    entries: BTreeMap<String, BlockAudit>,
}

impl BlockAuditList {
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, audit: BlockAudit) {
        self.entries.insert(audit.domain.clone(), audit);
    }

    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&BlockAudit> {
        self.entries.get(domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockAudit> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeverityLevel;

    #[test]
    fn test_later_block_replaces_earlier() {
        let list = Blocklist::from_blocks(
            "test",
            [
                DomainBlock::new("example.org", SeverityLevel::Silence),
                DomainBlock::new("example.org", SeverityLevel::Suspend),
            ],
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("example.org").unwrap().severity, SeverityLevel::Suspend);
    }

    #[test]
    fn test_iterates_in_domain_order() {
        let list = Blocklist::from_blocks(
            "test",
            [
                DomainBlock::new("zzz.example", SeverityLevel::Suspend),
                DomainBlock::new("aaa.example", SeverityLevel::Suspend),
            ],
        );
        let domains: Vec<_> = list.domains().collect();
        assert_eq!(domains, vec!["aaa.example", "zzz.example"]);
    }

    #[test]
    fn test_audit_percent() {
        let audit = BlockAudit::new("example.org", 3, 4);
        assert!((audit.percent - 75.0).abs() < f64::EPSILON);
        assert!(BlockAudit::new("example.org", 0, 0).percent.abs() < f64::EPSILON);
    }
}
