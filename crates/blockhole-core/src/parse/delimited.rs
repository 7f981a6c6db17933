//! CSV list formats.

use super::{BlockBuilder, ParseOptions};
use crate::error::Result;
use crate::types::DomainBlock;

/// CSV with a header row naming the block fields
pub(super) fn parse_csv(raw: &str, options: &ParseOptions) -> Result<Vec<DomainBlock>> {
    parse_with_headers(raw, options, str::to_string)
}

/// Mastodon's export CSV, which writes its headers as `#domain,#severity,...`
pub(super) fn parse_mastodon_csv(raw: &str, options: &ParseOptions) -> Result<Vec<DomainBlock>> {
    parse_with_headers(raw, options, |name| name.trim_start_matches('#').to_string())
}

fn parse_with_headers<F>(raw: &str, options: &ParseOptions, rename: F) -> Result<Vec<DomainBlock>>
where
    F: Fn(&str) -> String,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(&rename).collect();

    let mut blocks = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut builder = BlockBuilder::new(options);
        for (name, value) in headers.iter().zip(record.iter()) {
            builder.set_text(name, value)?;
        }
        blocks.push(builder.finish()?);
    }
    Ok(blocks)
}
