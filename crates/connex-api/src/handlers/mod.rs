//! HTTP request handlers for the ConnexView API
//!
//! Handlers normalize parameters, delegate to the engines in `connex-core`
//! and wrap results in `{success: true, ...}` envelopes.

pub mod dashboard;
pub mod data;
pub mod interfaces;
pub mod meta;
pub mod params;
