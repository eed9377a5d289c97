//! connex-store - Record store and sample data for ConnexView
//!
//! [`MemoryStore`] keeps execution logs in process and implements the full
//! [`connex_core::LogStore`] contract. The [`seed`] module generates
//! realistic sample executions and reseeds a store in fixed-size batches.

pub mod memory;
pub mod seed;

pub use memory::MemoryStore;
pub use seed::{SampleGenerator, SeedReport};
