//! Synchronize domain blocklists across Mastodon instances.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use blockhole::{merge_blocklists, InstanceClient, MergeOptions, Pacer, PushOptions};
//!
//! #[tokio::main]
//! async fn main() -> blockhole::Result<()> {
//!     let fields = blockhole::FieldSet::new();
//!     let source = InstanceClient::new("mastodon.social")?;
//!     let theirs = source.domain_blocks().list(false, &fields).await?;
//!
//!     let merged = merge_blocklists(&[theirs], &MergeOptions::default(), None);
//!
//!     let mine = InstanceClient::builder("social.example.org")
//!         .token("admin-token")
//!         .build()?;
//!     let report = blockhole::push_blocklist(&mine, &merged, &PushOptions::default(), &Pacer::default()).await?;
//!     println!("{} created, {} updated", report.created(), report.updated());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - rustls and the sync engine
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS
//! - `sync` - Merge, allowlist and push engine

// Re-export core types
pub use blockhole_core::*;

// Re-export client
pub use blockhole_client::{InstanceClient, InstanceClientBuilder, UrlFetcher};

// Re-export the sync engine if enabled
#[cfg(feature = "sync")]
pub use blockhole_sync::*;

// Re-export runtime for convenience
pub use tokio;
