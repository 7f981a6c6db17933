//! Merge, allowlist and push stages of the blockhole pipeline.
//!
//! - [`merge_blocklists`] folds per-source lists into one, gated by a mention threshold
//! - [`apply_allowlists`] drops explicitly allowed domains
//! - [`push_blocklist`] reconciles the result against a [`BlockDestination`],
//!   spacing calls with a shared [`Pacer`]
//!
//! # Example
//!
//! ```rust,ignore
//! use blockhole_client::InstanceClient;
//! use blockhole_sync::{merge_blocklists, push_blocklist, MergeOptions, Pacer, PushOptions};
//!
//! let merged = merge_blocklists(&sources, &MergeOptions::default(), None);
//! let client = InstanceClient::builder("social.example.org").token(token).build()?;
//! let report = push_blocklist(&client, &merged, &PushOptions::default(), &Pacer::default()).await?;
//! println!("{} created, {} updated", report.created(), report.updated());
//! ```

mod allowlist;
mod destination;
pub mod merge;
mod pacing;
pub mod reconcile;

pub use allowlist::apply_allowlists;
pub use destination::BlockDestination;
pub use merge::{
    apply_mergeplan, merge_blocklists, merge_comments, MergeOptions, MergePlan, ThresholdType,
};
pub use pacing::{Pacer, DEFAULT_CALL_INTERVAL};
pub use reconcile::{push_blocklist, Change, PushOptions, PushReport, Reconciler};
