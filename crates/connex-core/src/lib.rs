//! connex-core - Core types and engines for the ConnexView dashboard
//!
//! This crate holds everything that does not depend on a transport:
//! the execution-log data model, the [`LogStore`] abstraction that record
//! stores implement, the query builder that turns a [`QueryFilter`] into
//! store-native expressions, and the pagination and summary engines that
//! shape store results for the API.

pub mod aggregate;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod store;
pub mod summary;

pub use aggregate::ExecutionStats;
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use models::*;
pub use pagination::{PageRequest, PageResult, Pagination};
pub use store::{DistinctField, Group, GroupId, GroupKey, LogFilter, LogQuery, LogStore, TextMatch};
