//! Query Builder - turns request filters into store-native expressions

use crate::models::{QueryFilter, TimeWindow};
use crate::store::{LogFilter, LogQuery, TextMatch};

/// Filter expression restricting records to `window`
pub fn window_filter(window: &TimeWindow) -> LogFilter {
    LogFilter {
        since: window.start,
        until: window.end,
        ..LogFilter::all()
    }
}

/// Filter expression for a log-browser request.
///
/// Empty text filters are omitted rather than matching the empty string.
pub fn build_filter(filter: &QueryFilter) -> LogFilter {
    LogFilter {
        status: filter.status,
        interface_name: text_match(filter.interface_name.as_deref()),
        integration_key: text_match(filter.integration_key.as_deref()),
        ..window_filter(&filter.window)
    }
}

/// Full page query: filter, sort and skip/limit
pub fn build_query(filter: &QueryFilter) -> LogQuery {
    LogQuery {
        filter: build_filter(filter),
        sort: filter.sort,
        skip: filter.page.skip(),
        limit: Some(filter.page.limit()),
    }
}

fn text_match(needle: Option<&str>) -> Option<TextMatch> {
    needle.filter(|s| !s.is_empty()).map(TextMatch::new)
}
