//! API endpoint modules.

mod domain_blocks;
mod measures;

pub use domain_blocks::{CreateOutcome, DeleteOutcome, DomainBlockApi};
pub use measures::MeasuresApi;
