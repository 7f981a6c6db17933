//! Writing lists to disk and printing run summaries.

use anyhow::{Context as _, Result};
use blockhole::export::{write_audit_csv, write_blocklist_csv, write_blocklist_json};
use blockhole::{BlockAuditList, Blocklist, Change, FieldSet};
use colored::Colorize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

use crate::pipeline::SyncOutcome;

/// File formats for the merged blocklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` files get JSON, anything else CSV
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Save `blocklist` with the given columns, in the format implied by `path`.
pub fn save_blocklist(blocklist: &Blocklist, fields: &FieldSet, path: &Path) -> Result<()> {
    let writer = create(path)?;
    match ExportFormat::for_path(path) {
        ExportFormat::Csv => write_blocklist_csv(blocklist, fields, writer)?,
        ExportFormat::Json => write_blocklist_json(blocklist, fields, writer)?,
    }
    Ok(())
}

/// Save a fetched source list as CSV in `dir`, named after its origin.
pub fn save_intermediate(blocklist: &Blocklist, fields: &FieldSet, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(intermediate_name(&blocklist.origin));
    debug!(origin = %blocklist.origin, path = %path.display(), "saving intermediate blocklist");
    write_blocklist_csv(blocklist, fields, create(&path)?)?;
    Ok(path)
}

fn intermediate_name(origin: &str) -> String {
    format!("{}.csv", origin.replace('/', "-"))
}

pub fn save_audit(audit: &BlockAuditList, path: &Path) -> Result<()> {
    write_audit_csv(audit, create(path)?)?;
    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Unchanged")]
    unchanged: String,
    #[tabled(rename = "Capped")]
    capped: String,
    #[tabled(rename = "Warnings")]
    warnings: String,
}

/// Print the merged list size and a per-destination table
pub fn print_summary(outcome: &SyncOutcome) {
    println!(
        "{} {} blocks from {} sources",
        "Merged:".bold(),
        outcome.merged.len().to_string().cyan().bold(),
        outcome.sources
    );

    if outcome.reports.is_empty() && outcome.failures.is_empty() {
        return;
    }

    let mut rows: Vec<SummaryRow> = outcome
        .reports
        .iter()
        .map(|report| SummaryRow {
            destination: report.destination.clone(),
            status: if report.dryrun {
                "dry run".yellow().to_string()
            } else {
                "ok".green().to_string()
            },
            created: report.created().to_string(),
            updated: report.updated().to_string(),
            unchanged: report.unchanged.to_string(),
            capped: report.capped.len().to_string(),
            warnings: report.warnings.len().to_string(),
        })
        .collect();

    rows.extend(outcome.failures.iter().map(|failure| SummaryRow {
        destination: failure.destination.clone(),
        status: "failed".red().to_string(),
        created: "-".into(),
        updated: "-".into(),
        unchanged: "-".into(),
        capped: "-".into(),
        warnings: "-".into(),
    }));

    println!();
    println!("{}", Table::new(&rows).with(Style::rounded()));

    for report in outcome.reports.iter().filter(|r| r.dryrun && !r.changes.is_empty()) {
        println!();
        println!("{} {}", "Planned for".bold(), report.destination.yellow());
        for change in &report.changes {
            match change {
                Change::Create { block } => {
                    println!("  {} {} ({})", "+".green(), change.domain(), block.severity);
                }
                Change::Update { fields, .. } => {
                    println!("  {} {} [{}]", "~".yellow(), change.domain(), fields.join(", "));
                }
            }
        }
    }

    for report in &outcome.reports {
        for warning in &report.warnings {
            println!("{} {}: {}", "warning:".yellow(), report.destination, warning);
        }
    }
    for failure in &outcome.failures {
        println!("{} {}: {}", "error:".red(), failure.destination, failure.error);
    }
}
