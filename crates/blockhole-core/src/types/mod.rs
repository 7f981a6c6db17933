mod block;
mod blocklist;
mod field;
mod severity;

pub use block::*;
pub use blocklist::*;
pub use field::*;
pub use severity::*;
