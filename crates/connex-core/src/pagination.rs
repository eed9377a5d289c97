//! Pagination Engine
//!
//! Page numbers are 1-based. Out-of-range pages are not an error: they
//! produce an empty page with accurate metadata.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;
use crate::models::{ExecutionLog, QueryFilter};
use crate::query;
use crate::store::LogStore;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 1000;

/// A normalized page request; both fields are always >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamp page to >= 1 and limit to `1..=MAX_LIMIT`
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1) as u64,
            limit: (limit.max(1) as u64).min(MAX_LIMIT),
        }
    }

    /// Normalize raw query-string values; unparsable input takes the default
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>, default: u64| {
            v.and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(default as i64)
        };
        Self::new(parse(page, DEFAULT_PAGE), parse(limit, DEFAULT_LIMIT))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Records to skip before this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Navigation metadata echoed with every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u64,
}

impl Pagination {
    pub fn compute(request: PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(request.limit);
        Self {
            current_page: request.page,
            total_pages,
            total_count,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
            limit: request.limit,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::compute(PageRequest::default(), 0)
    }
}

/// One page of items plus its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Fetch one page of logs.
///
/// The page query and the count run concurrently; they are independent
/// reads, so a write landing between them can make the two disagree.
pub async fn paginate(
    store: &dyn LogStore,
    filter: &QueryFilter,
) -> StoreResult<PageResult<ExecutionLog>> {
    let log_query = query::build_query(filter);
    let (items, total) =
        futures::try_join!(store.find(&log_query), store.count(&log_query.filter))?;

    let pagination = Pagination::compute(filter.page, total);
    debug!(
        page = pagination.current_page,
        limit = pagination.limit,
        total = total,
        returned = items.len(),
        "Served log page"
    );
    Ok(PageResult { items, pagination })
}
