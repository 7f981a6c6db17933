//! HTTP client for Mastodon instance APIs and URL-hosted blocklists.
//!
//! This crate provides the [`InstanceClient`] for reading and writing an
//! instance's domain blocks, and the [`UrlFetcher`] for raw list downloads.

mod client;
mod config;
mod fetch;
pub mod api;

pub use api::{CreateOutcome, DeleteOutcome};
pub use client::{InstanceClient, InstanceClientBuilder};
pub use config::*;
pub use fetch::UrlFetcher;
pub use blockhole_core::{BlockholeError, Result};
