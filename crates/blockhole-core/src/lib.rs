//! Core types for the blockhole blocklist synchronizer.
//!
//! This crate provides the foundational types used across blockhole:
//!
//! - **Types**: [`SeverityLevel`], [`DomainBlock`], [`Blocklist`] and the audit records
//! - **Parsers**: normalise CSV, JSON and RapidBlock lists into [`Blocklist`]s
//! - **Export**: write blocklists and audits back out as CSV or JSON
//! - **Errors**: one error type, [`BlockholeError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use blockhole_core::{parse_blocklist, FieldSet, ListFormat, SeverityLevel};
//!
//! let raw = "domain,severity\nexample.org,silence\n";
//! let list = parse_blocklist(raw, "local", ListFormat::Csv, &FieldSet::new(), SeverityLevel::Suspend)?;
//! assert_eq!(list.get("example.org").unwrap().severity, SeverityLevel::Silence);
//! ```

mod error;
pub mod export;
pub mod parse;
pub mod types;

pub use error::{BlockholeError, Result};
pub use parse::{parse_blocklist, str2bool, ListFormat, ParseOptions};
pub use types::*;
