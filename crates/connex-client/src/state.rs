//! Dashboard filter state
//!
//! Holds what the log browser is currently showing. Changing any filter
//! sends the browser back to page 1; the time range survives a clear.

use connex_core::{ExecutionStatus, Pagination, SortField, SortOrder};

use crate::types::LogsParams;

/// Most page buttons shown at once
pub const PAGE_WINDOW: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFilters {
    time_range: String,
    status: Option<ExecutionStatus>,
    interface_name: String,
    integration_key: String,
    sort_field: SortField,
    sort_order: SortOrder,
    page: u64,
    limit: u64,
}

impl Default for DashboardFilters {
    fn default() -> Self {
        Self {
            time_range: "24h".to_string(),
            status: None,
            interface_name: String::new(),
            integration_key: String::new(),
            sort_field: SortField::Timestamp,
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 10,
        }
    }
}

impl DashboardFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_range(&self) -> &str {
        &self.time_range
    }

    pub fn status(&self) -> Option<ExecutionStatus> {
        self.status
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    pub fn integration_key(&self) -> &str {
        &self.integration_key
    }

    pub fn sort(&self) -> (SortField, SortOrder) {
        (self.sort_field, self.sort_order)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn set_time_range(&mut self, range: impl Into<String>) {
        self.time_range = range.into();
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<ExecutionStatus>) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_interface_name(&mut self, needle: impl Into<String>) {
        self.interface_name = needle.into();
        self.page = 1;
    }

    pub fn set_integration_key(&mut self, needle: impl Into<String>) {
        self.integration_key = needle.into();
        self.page = 1;
    }

    /// Sort by `field`; picking the current field again flips the order
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = match self.sort_order {
                SortOrder::Asc => SortOrder::Desc,
                SortOrder::Desc => SortOrder::Asc,
            };
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Desc;
        }
        self.page = 1;
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit.clamp(1, connex_core::pagination::MAX_LIMIT);
        self.page = 1;
    }

    /// Jump to `page`, never below 1
    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    /// Reset every filter except the time range
    pub fn clear_filters(&mut self) {
        *self = Self {
            time_range: std::mem::take(&mut self.time_range),
            ..Self::default()
        };
    }

    /// Status/name/key filters in effect, as `(parameter, value)` pairs
    pub fn active_filters(&self) -> Vec<(&'static str, String)> {
        let mut active = Vec::new();
        if let Some(status) = self.status {
            active.push(("status", status.as_str().to_string()));
        }
        if !self.interface_name.trim().is_empty() {
            active.push(("interfaceName", self.interface_name.trim().to_string()));
        }
        if !self.integration_key.trim().is_empty() {
            active.push(("integrationKey", self.integration_key.trim().to_string()));
        }
        active
    }

    /// Adopt the page the server actually served.
    ///
    /// When the current page fell past the end (for example after a filter
    /// shrank the result) it is pulled back to the last page. Returns true
    /// if the page changed and should be fetched again.
    pub fn sync_with(&mut self, pagination: &Pagination) -> bool {
        let last = pagination.total_pages.max(1);
        if self.page > last {
            self.page = last;
            return true;
        }
        self.page = pagination.current_page.max(1);
        false
    }

    /// Request parameters for the current state
    pub fn to_params(&self) -> LogsParams {
        LogsParams {
            page: self.page,
            limit: self.limit,
            time_range: self.time_range.clone(),
            status: self.status,
            interface_name: self.interface_name.trim().to_string(),
            integration_key: self.integration_key.trim().to_string(),
            sort_by: self.sort_field.as_str().to_string(),
            sort_order: self.sort_order.as_str().to_string(),
        }
    }
}

/// Page numbers to show around `current`, at most [`PAGE_WINDOW`] of them
pub fn page_window(current: u64, total: u64) -> Vec<u64> {
    if total <= PAGE_WINDOW {
        return (1..=total).collect();
    }
    let start = if current <= 3 {
        1
    } else if current >= total - 2 {
        total - PAGE_WINDOW + 1
    } else {
        current - 2
    };
    (start..start + PAGE_WINDOW).collect()
}
