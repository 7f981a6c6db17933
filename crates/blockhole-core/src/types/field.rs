use crate::error::{BlockholeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A named attribute of a domain block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockField {
    Domain,
    Severity,
    PublicComment,
    PrivateComment,
    RejectMedia,
    RejectReports,
    Obfuscate,
    Id,
}

impl BlockField {
    /// Every field except `id`, in export column order
    pub const ATTRIBUTES: [Self; 7] = [
        Self::Domain,
        Self::Severity,
        Self::PublicComment,
        Self::PrivateComment,
        Self::RejectMedia,
        Self::RejectReports,
        Self::Obfuscate,
    ];

    /// Boolean-valued fields
    pub const FLAGS: [Self; 3] = [Self::RejectMedia, Self::RejectReports, Self::Obfuscate];

    /// Field name as it appears in list headers and API payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Severity => "severity",
            Self::PublicComment => "public_comment",
            Self::PrivateComment => "private_comment",
            Self::RejectMedia => "reject_media",
            Self::RejectReports => "reject_reports",
            Self::Obfuscate => "obfuscate",
            Self::Id => "id",
        }
    }

    /// Look up a field by name, returning `None` for anything unrecognised
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "domain" => Some(Self::Domain),
            "severity" => Some(Self::Severity),
            "public_comment" => Some(Self::PublicComment),
            "private_comment" => Some(Self::PrivateComment),
            "reject_media" => Some(Self::RejectMedia),
            "reject_reports" => Some(Self::RejectReports),
            "obfuscate" => Some(Self::Obfuscate),
            "id" => Some(Self::Id),
            _ => None,
        }
    }
}

impl FromStr for BlockField {
    type Err = BlockholeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| BlockholeError::UnknownField(s.to_string()))
    }
}

impl std::fmt::Display for BlockField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of block fields that always contains `domain` and `severity`.
///
/// Used for both import (which attributes a parser populates, which attributes
/// are diffed at a destination) and export (which columns are written).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeSet<BlockField>,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self {
            fields: BTreeSet::from([BlockField::Domain, BlockField::Severity]),
        }
    }
}

impl FieldSet {
    /// The implicit `domain` + `severity` set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All attributes except `id`
    #[must_use]
    pub fn all() -> Self {
        BlockField::ATTRIBUTES.into_iter().collect()
    }

    /// Build a set from field names, on top of the implicit fields
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.as_ref().parse()?);
        }
        Ok(set)
    }

    /// Return a copy of this set extended with `extra`. `self` is left untouched.
    #[must_use]
    pub fn extended<I: IntoIterator<Item = BlockField>>(&self, extra: I) -> Self {
        let mut set = self.clone();
        set.fields.extend(extra);
        set
    }

    /// Return a copy of this set that also carries `id`
    #[must_use]
    pub fn with_id(&self) -> Self {
        self.extended([BlockField::Id])
    }

    pub fn insert(&mut self, field: BlockField) {
        self.fields.insert(field);
    }

    #[must_use]
    pub fn contains(&self, field: BlockField) -> bool {
        self.fields.contains(&field)
    }

    /// Iterate in column order (`domain`, `severity`, ... , `id`)
    pub fn iter(&self) -> impl Iterator<Item = BlockField> + '_ {
        self.fields.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<BlockField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = BlockField>>(iter: I) -> Self {
        let mut set = Self::new();
        set.fields.extend(iter);
        set
    }
}

impl std::fmt::Display for FieldSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(BlockField::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
