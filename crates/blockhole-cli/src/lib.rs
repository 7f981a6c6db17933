//! # blockhole-cli
//!
//! Command-line front end for blockhole.
//!
//! ## Pipeline
//!
//! 1. Fetch blocklists from URL and instance sources
//! 2. Merge them with the configured mergeplan and threshold
//! 3. Drop allowlisted domains
//! 4. Save the merged list and audit, if asked
//! 5. Push the result to every destination instance

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;
pub mod pipeline;

pub use cli::run;
