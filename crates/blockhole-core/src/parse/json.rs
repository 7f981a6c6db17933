//! JSON list formats.

use super::{BlockBuilder, ParseOptions};
use crate::error::{BlockholeError, Result};
use crate::types::DomainBlock;
use serde_json::{Map, Value};

/// A JSON array of block objects, as served by the Mastodon admin API
pub(super) fn parse_json(raw: &str, options: &ParseOptions) -> Result<Vec<DomainBlock>> {
    parse_items(raw, options, |name| name)
}

/// The public `instance/domain_blocks` endpoint calls the public comment `comment`
pub(super) fn parse_mastodon_api_public(
    raw: &str,
    options: &ParseOptions,
) -> Result<Vec<DomainBlock>> {
    parse_items(raw, options, |name| {
        if name == "comment" {
            "public_comment"
        } else {
            name
        }
    })
}

fn parse_items<F>(raw: &str, options: &ParseOptions, rename: F) -> Result<Vec<DomainBlock>>
where
    F: for<'k> Fn(&'k str) -> &'k str,
{
    let items: Vec<Map<String, Value>> = match serde_json::from_str(raw)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(BlockholeError::Parse(format!(
                    "expected a block object, found {other}"
                ))),
            })
            .collect::<Result<_>>()?,
        _ => {
            return Err(BlockholeError::Parse(
                "expected a JSON array of blocks".into(),
            ))
        }
    };

    items
        .iter()
        .map(|item| {
            let mut builder = BlockBuilder::new(options);
            for (key, value) in item {
                let name = rename(key);
                match value {
                    Value::Null => {}
                    Value::Bool(flag) => builder.set_flag(name, *flag)?,
                    Value::String(text) => builder.set_text(name, text)?,
                    Value::Number(number) => builder.set_text(name, &number.to_string())?,
                    Value::Array(_) | Value::Object(_) => {}
                }
            }
            builder.finish()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldSet, SeverityLevel};

    const ADMIN_JSON: &str = r#"[
        {"id": "234", "domain": "qoto.org", "created_at": "2023-01-05T09:38:21.000Z",
         "severity": "suspend", "reject_media": false, "reject_reports": false,
         "private_comment": null, "public_comment": null, "obfuscate": false},
        {"id": "235", "domain": "develop.gab.com", "created_at": "2023-01-05T09:38:21.000Z",
         "severity": "silence", "reject_media": true, "reject_reports": false,
         "private_comment": "ugh", "public_comment": "Dummy comment", "obfuscate": false},
        {"id": 236, "domain": "gab.ai", "severity": "noop", "reject_media": "yes"}
    ]"#;

    const PUBLIC_JSON: &str = r#"[
        {"domain": "qoto.org", "digest": "aaaa", "severity": "suspend", "comment": "spam"},
        {"domain": "m*st*d*n.example", "digest": "bbbb", "severity": "silence", "comment": null}
    ]"#;

    fn options(fields: &[&str]) -> ParseOptions {
        ParseOptions {
            import_fields: FieldSet::from_names(fields).unwrap(),
            max_severity: SeverityLevel::Suspend,
        }
    }

    #[test]
    fn test_parse_json() {
        let blocks = parse_json(ADMIN_JSON, &options(&[])).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].domain, "develop.gab.com");
        assert_eq!(blocks[1].severity, SeverityLevel::Silence);
        assert!(blocks[1].public_comment.is_empty());
        assert!(!blocks[1].reject_media);
        assert!(blocks[0].id.is_none());
        assert_eq!(blocks[2].severity, SeverityLevel::None);
    }

    #[test]
    fn test_parse_json_with_fields() {
        let blocks = parse_json(
            ADMIN_JSON,
            &options(&["public_comment", "private_comment", "reject_media", "id"]),
        )
        .unwrap();
        assert_eq!(blocks[0].id.as_deref(), Some("234"));
        assert!(blocks[0].public_comment.is_empty());
        assert_eq!(blocks[1].public_comment, "Dummy comment");
        assert_eq!(blocks[1].private_comment, "ugh");
        assert!(blocks[1].reject_media);
        // Textual booleans and numeric ids are accepted too
        assert!(blocks[2].reject_media);
        assert_eq!(blocks[2].id.as_deref(), Some("236"));
    }

    #[test]
    fn test_parse_json_max_severity() {
        let mut opts = options(&[]);
        opts.max_severity = SeverityLevel::None;
        let blocks = parse_json(ADMIN_JSON, &opts).unwrap();
        assert!(blocks.iter().all(|b| b.severity == SeverityLevel::None));
    }

    #[test]
    fn test_parse_mastodon_api_public() {
        let blocks = parse_mastodon_api_public(PUBLIC_JSON, &options(&["public_comment"])).unwrap();
        assert_eq!(blocks[0].public_comment, "spam");
        assert_eq!(blocks[1].domain, "m*st*d*n.example");
        assert!(blocks[1].public_comment.is_empty());

        // Without the field requested the comment is dropped
        let blocks = parse_mastodon_api_public(PUBLIC_JSON, &options(&[])).unwrap();
        assert!(blocks[0].public_comment.is_empty());
    }

    #[test]
    fn test_not_an_array() {
        let err = parse_json(r#"{"domain": "example.org"}"#, &options(&[])).unwrap_err();
        assert!(matches!(err, BlockholeError::Parse(_)));

        let err = parse_json("[1, 2]", &options(&[])).unwrap_err();
        assert!(matches!(err, BlockholeError::Parse(_)));

        let err = parse_json("not json", &options(&[])).unwrap_err();
        assert!(matches!(err, BlockholeError::Json(_)));
    }

    #[test]
    fn test_invalid_severity() {
        let err = parse_json(r#"[{"domain": "example.org", "severity": "ban"}]"#, &options(&[]))
            .unwrap_err();
        assert!(matches!(err, BlockholeError::InvalidSeverity(_)));
    }
}
