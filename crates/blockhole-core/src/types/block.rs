use super::field::{BlockField, FieldSet};
use super::severity::SeverityLevel;
use serde::{Deserialize, Serialize};

/// A single domain block
///
/// `id` is only set for blocks read back from a destination instance. Two
/// blocks compare equal when every attribute other than `id` matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainBlock {
    /// Blocked domain. May be obfuscated (contain `*`) on public lists.
    pub domain: String,

    /// Block severity
    #[serde(default)]
    pub severity: SeverityLevel,

    /// Comment shown publicly
    #[serde(default)]
    pub public_comment: String,

    /// Comment shown to instance admins only
    #[serde(default)]
    pub private_comment: String,

    /// Reject media files from the domain
    #[serde(default)]
    pub reject_media: bool,

    /// Reject reports from the domain
    #[serde(default)]
    pub reject_reports: bool,

    /// Obfuscate the domain name in the public block list
    #[serde(default)]
    pub obfuscate: bool,

    /// Block id at a specific destination instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A single field value taken out of a [`DomainBlock`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Severity(SeverityLevel),
    Flag(bool),
    Id(Option<&'a str>),
}

impl std::fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Severity(level) => write!(f, "{level}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Id(id) => f.write_str(id.unwrap_or("")),
        }
    }
}

impl DomainBlock {
    /// Create a block for `domain` at `severity`, other attributes defaulted
    #[must_use]
    pub fn new(domain: impl Into<String>, severity: SeverityLevel) -> Self {
        Self {
            domain: domain.into(),
            severity,
            ..Self::default()
        }
    }

    /// Returns true if the domain is obfuscated and cannot be matched
    #[must_use]
    pub fn is_obfuscated(&self) -> bool {
        self.domain.contains('*')
    }

    /// Read one field
    #[must_use]
    pub fn get(&self, field: BlockField) -> FieldValue<'_> {
        match field {
            BlockField::Domain => FieldValue::Text(&self.domain),
            BlockField::Severity => FieldValue::Severity(self.severity),
            BlockField::PublicComment => FieldValue::Text(&self.public_comment),
            BlockField::PrivateComment => FieldValue::Text(&self.private_comment),
            BlockField::RejectMedia => FieldValue::Flag(self.reject_media),
            BlockField::RejectReports => FieldValue::Flag(self.reject_reports),
            BlockField::Obfuscate => FieldValue::Flag(self.obfuscate),
            BlockField::Id => FieldValue::Id(self.id.as_deref()),
        }
    }

    /// Copy one field from `other` into `self`
    pub fn set_from(&mut self, other: &Self, field: BlockField) {
        match field {
            BlockField::Domain => self.domain.clone_from(&other.domain),
            BlockField::Severity => self.severity = other.severity,
            BlockField::PublicComment => self.public_comment.clone_from(&other.public_comment),
            BlockField::PrivateComment => self.private_comment.clone_from(&other.private_comment),
            BlockField::RejectMedia => self.reject_media = other.reject_media,
            BlockField::RejectReports => self.reject_reports = other.reject_reports,
            BlockField::Obfuscate => self.obfuscate = other.obfuscate,
            BlockField::Id => self.id.clone_from(&other.id),
        }
    }

    /// Fields in `fields` whose value differs between `self` and `other`.
    ///
    /// `id` is never reported: it identifies a block at a destination and is
    /// not a block attribute.
    #[must_use]
    pub fn compare_fields(&self, other: &Self, fields: &FieldSet) -> Vec<BlockField> {
        fields
            .iter()
            .filter(|&field| field != BlockField::Id)
            .filter(|&field| self.get(field) != other.get(field))
            .collect()
    }

    /// Copy of `self` with the given fields replaced by `other`'s values
    #[must_use]
    pub fn overlaid(&self, other: &Self, fields: &[BlockField]) -> Self {
        let mut block = self.clone();
        for &field in fields {
            block.set_from(other, field);
        }
        block
    }

    /// Field values as strings, in the order of `fields`
    #[must_use]
    pub fn record(&self, fields: &FieldSet) -> Vec<String> {
        fields.iter().map(|f| self.get(f).to_string()).collect()
    }
}

impl PartialEq for DomainBlock {
    fn eq(&self, other: &Self) -> bool {
        BlockField::ATTRIBUTES
            .iter()
            .all(|&field| self.get(field) == other.get(field))
    }
}

impl Eq for DomainBlock {}

impl std::fmt::Display for DomainBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.domain, self.severity)?;
        let flags: Vec<&str> = BlockField::FLAGS
            .iter()
            .filter(|&&field| self.get(field) == FieldValue::Flag(true))
            .map(|field| field.as_str())
            .collect();
        if !flags.is_empty() {
            write!(f, " [{}]", flags.join(", "))?;
        }
        if !self.public_comment.is_empty() {
            write!(f, " \"{}\"", self.public_comment)?;
        }
        Ok(())
    }
}
