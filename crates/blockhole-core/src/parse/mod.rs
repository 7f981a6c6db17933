//! Blocklist format parsers.
//!
//! Every supported list format maps to a plain `raw text -> blocks` function.
//! [`parse_blocklist`] picks the function for a [`ListFormat`], runs it, and
//! collects the result into a [`Blocklist`].

mod delimited;
mod json;
mod rapidblock;

use crate::error::{BlockholeError, Result};
use crate::types::{BlockField, Blocklist, DomainBlock, FieldSet, SeverityLevel};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Supported blocklist formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListFormat {
    /// CSV with a header row of field names
    #[default]
    #[serde(rename = "csv")]
    Csv,
    /// Mastodon 4.1+ export CSV, header names prefixed with `#`
    #[serde(rename = "mastodon_csv")]
    MastodonCsv,
    /// JSON array of block objects (Mastodon admin API shape)
    #[serde(rename = "json")]
    Json,
    /// JSON array from the Mastodon public `instance/domain_blocks` endpoint
    #[serde(rename = "mastodon_api_public")]
    MastodonApiPublic,
    /// RapidBlock newline separated domain list
    #[serde(rename = "rapidblock.csv")]
    RapidBlockCsv,
    /// RapidBlock JSON document
    #[serde(rename = "rapidblock.json")]
    RapidBlockJson,
}

/// A format parser: raw payload to unordered blocks
pub type ParseFn = fn(&str, &ParseOptions) -> Result<Vec<DomainBlock>>;

impl ListFormat {
    pub const ALL: [Self; 6] = [
        Self::Csv,
        Self::MastodonCsv,
        Self::Json,
        Self::MastodonApiPublic,
        Self::RapidBlockCsv,
        Self::RapidBlockJson,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::MastodonCsv => "mastodon_csv",
            Self::Json => "json",
            Self::MastodonApiPublic => "mastodon_api_public",
            Self::RapidBlockCsv => "rapidblock.csv",
            Self::RapidBlockJson => "rapidblock.json",
        }
    }

    /// The parser registered for this format
    #[must_use]
    pub fn parser(self) -> ParseFn {
        match self {
            Self::Csv => delimited::parse_csv,
            Self::MastodonCsv => delimited::parse_mastodon_csv,
            Self::Json => json::parse_json,
            Self::MastodonApiPublic => json::parse_mastodon_api_public,
            Self::RapidBlockCsv => rapidblock::parse_rapidblock_csv,
            Self::RapidBlockJson => rapidblock::parse_rapidblock_json,
        }
    }
}

impl FromStr for ListFormat {
    type Err = BlockholeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| BlockholeError::UnsupportedFormat(s.to_string()))
    }
}

impl std::fmt::Display for ListFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by every parser
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Attributes to populate. `domain` and `severity` are always included.
    pub import_fields: FieldSet,

    /// Severity ceiling; anything stricter is lowered to this
    pub max_severity: SeverityLevel,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            import_fields: FieldSet::new(),
            max_severity: SeverityLevel::Suspend,
        }
    }
}

/// Parse a raw blocklist payload in the given format
pub fn parse_blocklist(
    raw: &str,
    origin: &str,
    format: ListFormat,
    import_fields: &FieldSet,
    max_severity: SeverityLevel,
) -> Result<Blocklist> {
    debug!(%origin, %format, %import_fields, "parsing blocklist");

    let options = ParseOptions {
        import_fields: import_fields.clone(),
        max_severity,
    };
    let blocks = (format.parser())(raw, &options).map_err(|e| e.for_source(origin))?;

    Ok(Blocklist::from_blocks(origin, blocks))
}

/// Convert a textual boolean
pub fn str2bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "t" | "1" | "y" | "yes" => Ok(true),
        "" | "false" | "f" | "0" | "n" | "no" => Ok(false),
        _ => Err(BlockholeError::BooleanParse(value.to_string())),
    }
}

/// Builds one block out of named field values, honouring the parse options
struct BlockBuilder<'a> {
    options: &'a ParseOptions,
    block: DomainBlock,
}

impl<'a> BlockBuilder<'a> {
    fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            block: DomainBlock::default(),
        }
    }

    /// Field to populate for `name`, or `None` if it should be skipped
    fn wanted(&self, name: &str) -> Option<BlockField> {
        let field = BlockField::lookup(name)?;
        if self.options.import_fields.contains(field) {
            Some(field)
        } else {
            debug!(field = name, "ignoring field");
            None
        }
    }

    fn set_text(&mut self, name: &str, value: &str) -> Result<()> {
        let Some(field) = self.wanted(name) else {
            return Ok(());
        };

        match field {
            BlockField::Domain => self.block.domain = value.to_string(),
            BlockField::Severity => self.block.severity = value.parse()?,
            BlockField::PublicComment => self.block.public_comment = value.to_string(),
            BlockField::PrivateComment => self.block.private_comment = value.to_string(),
            BlockField::RejectMedia => self.block.reject_media = str2bool(value)?,
            BlockField::RejectReports => self.block.reject_reports = str2bool(value)?,
            BlockField::Obfuscate => self.block.obfuscate = str2bool(value)?,
            BlockField::Id => {
                self.block.id = (!value.is_empty()).then(|| value.to_string());
            }
        }
        Ok(())
    }

    fn set_flag(&mut self, name: &str, value: bool) -> Result<()> {
        match self.wanted(name) {
            Some(BlockField::RejectMedia) => self.block.reject_media = value,
            Some(BlockField::RejectReports) => self.block.reject_reports = value,
            Some(BlockField::Obfuscate) => self.block.obfuscate = value,
            Some(field) => {
                return Err(BlockholeError::Parse(format!(
                    "field '{field}' cannot be a boolean"
                )))
            }
            None => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<DomainBlock> {
        if self.block.domain.is_empty() {
            return Err(BlockholeError::Parse("record has no domain".into()));
        }
        if self.block.severity > self.options.max_severity {
            debug!(
                domain = %self.block.domain,
                severity = %self.block.severity,
                max = %self.options.max_severity,
                "clamping severity"
            );
            self.block.severity = self.options.max_severity;
        }
        Ok(self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str2bool() {
        for value in ["true", "T", "1", "y", "Yes", "TRUE"] {
            assert!(str2bool(value).unwrap(), "{value}");
        }
        for value in ["", "false", "F", "0", "n", "NO"] {
            assert!(!str2bool(value).unwrap(), "{value}");
        }
        assert!(matches!(
            str2bool("maybe"),
            Err(BlockholeError::BooleanParse(v)) if v == "maybe"
        ));
    }

    #[test]
    fn test_format_names() {
        for format in ListFormat::ALL {
            assert_eq!(format.as_str().parse::<ListFormat>().unwrap(), format);
        }
        let err = "xml".parse::<ListFormat>().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_format_deserialize() {
        #[derive(Deserialize)]
        struct Source {
            format: ListFormat,
        }
        let source: Source = serde_json::from_str(r#"{"format": "rapidblock.json"}"#).unwrap();
        assert_eq!(source.format, ListFormat::RapidBlockJson);
    }

    #[test]
    fn test_parse_errors_name_the_source() {
        let err = parse_blocklist(
            "domain,severity\nexample.org,ban\n",
            "https://lists.example/bad.csv",
            ListFormat::Csv,
            &FieldSet::new(),
            SeverityLevel::Suspend,
        )
        .unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("https://lists.example/bad.csv"));
    }

    #[test]
    fn test_builder_clamps_severity() {
        let options = ParseOptions {
            import_fields: FieldSet::new(),
            max_severity: SeverityLevel::Silence,
        };
        let mut builder = BlockBuilder::new(&options);
        builder.set_text("domain", "example.org").unwrap();
        builder.set_text("severity", "suspend").unwrap();
        assert_eq!(builder.finish().unwrap().severity, SeverityLevel::Silence);
    }

    #[test]
    fn test_builder_requires_domain() {
        let options = ParseOptions::default();
        let builder = BlockBuilder::new(&options);
        assert!(matches!(builder.finish(), Err(BlockholeError::Parse(_))));
    }
}
