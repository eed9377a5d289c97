//! Shared data models for ConnexView

mod filter;
mod record;
mod summary;

pub use filter::*;
pub use record::*;
pub use summary::*;
