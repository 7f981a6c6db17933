//! Writers for merged blocklists and audit reports.

use crate::error::Result;
use crate::types::{BlockAuditList, Blocklist, FieldSet, FieldValue};
use serde_json::{Map, Value};
use std::io::Write;

/// Write `blocklist` as CSV with one column per export field, ordered by domain
pub fn write_blocklist_csv<W: Write>(
    blocklist: &Blocklist,
    fields: &FieldSet,
    writer: W,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(fields.iter().map(|f| f.as_str()))?;
    for block in blocklist {
        csv.write_record(block.record(fields))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `blocklist` as a JSON array of objects carrying the export fields
pub fn write_blocklist_json<W: Write>(
    blocklist: &Blocklist,
    fields: &FieldSet,
    mut writer: W,
) -> Result<()> {
    let items: Vec<Value> = blocklist
        .iter()
        .map(|block| {
            let object: Map<String, Value> = fields
                .iter()
                .map(|field| {
                    let value = match block.get(field) {
                        FieldValue::Text(text) => Value::from(text),
                        FieldValue::Severity(level) => Value::from(level.as_str()),
                        FieldValue::Flag(flag) => Value::from(flag),
                        FieldValue::Id(id) => id.map_or(Value::Null, Value::from),
                    };
                    (field.as_str().to_string(), value)
                })
                .collect();
            Value::Object(object)
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &items)?;
    writer.flush()?;
    Ok(())
}

/// Write the audit as `domain,count,percent` CSV
pub fn write_audit_csv<W: Write>(audit: &BlockAuditList, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for entry in audit.iter() {
        csv.serialize(entry)?;
    }
    csv.flush()?;
    Ok(())
}
