//! Dashboard façade
//!
//! Pairs a [`ConnexClient`] with the browser's [`DashboardFilters`]. Read
//! panels degrade to empty data when the server is unreachable so a view
//! can always render; writes and the health probe report their errors.

use connex_core::{ExecutionLog, NewExecutionLog, Pagination};
use tracing::warn;

use crate::client::ConnexClient;
use crate::error::Result;
use crate::state::{page_window, DashboardFilters};
use crate::types::*;

/// One rendered page of the log browser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogsView {
    pub logs: Vec<ExecutionLog>,
    /// `None` when the page could not be fetched
    pub pagination: Option<Pagination>,
    /// Page buttons to offer
    pub pages: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    client: ConnexClient,
    filters: DashboardFilters,
}

impl Dashboard {
    pub fn new(client: ConnexClient) -> Self {
        Self {
            client,
            filters: DashboardFilters::default(),
        }
    }

    pub fn client(&self) -> &ConnexClient {
        &self.client
    }

    pub fn filters(&self) -> &DashboardFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut DashboardFilters {
        &mut self.filters
    }

    // =========================================================================
    // Read panels
    // =========================================================================

    pub async fn summary(&self) -> SummaryResponse {
        degrade(
            "summary",
            self.client.summary(self.filters.time_range()).await,
        )
    }

    pub async fn performance(&self) -> PerformanceResponse {
        degrade(
            "performance",
            self.client.performance(self.filters.time_range()).await,
        )
    }

    pub async fn realtime(&self) -> RealtimeSnapshot {
        degrade("realtime", self.client.realtime().await)
    }

    pub async fn interface_names(&self) -> Vec<String> {
        degrade("interface names", self.client.interface_names().await)
    }

    pub async fn integration_keys(&self) -> Vec<String> {
        degrade("integration keys", self.client.integration_keys().await)
    }

    /// Summary and performance for `time_range`, fetched together
    pub async fn dashboard_data(&self, time_range: &str) -> DashboardData {
        let (summary, performance) = tokio::join!(
            self.client.summary(time_range),
            self.client.performance(time_range)
        );
        let summary = degrade("summary", summary);
        let performance = degrade("performance", performance);
        DashboardData {
            time_range: summary.time_range,
            summary: summary.summary,
            trends: summary.trends,
            performance: performance.performance_data,
        }
    }

    /// Fetch the current log page.
    ///
    /// If the filters point past the last page, the last page is fetched
    /// instead and the filters are updated to match.
    pub async fn logs(&mut self) -> LogsView {
        let mut page = match self.client.logs(&self.filters.to_params()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Failed to load logs");
                return LogsView::default();
            }
        };

        if self.filters.sync_with(&page.pagination) {
            match self.client.logs(&self.filters.to_params()).await {
                Ok(refetched) => page = refetched,
                Err(e) => {
                    warn!(error = %e, "Failed to load logs");
                    return LogsView::default();
                }
            }
        }

        LogsView {
            pages: page_window(page.pagination.current_page, page.pagination.total_pages),
            pagination: Some(page.pagination),
            logs: page.logs,
        }
    }

    // =========================================================================
    // Probes and writes
    // =========================================================================

    pub async fn health(&self) -> Result<HealthStatus> {
        self.client.health().await
    }

    pub async fn record_log(&self, log: &NewExecutionLog) -> Result<ExecutionLog> {
        self.client.record_log(log).await
    }

    /// Reseed the server. Cached panels stay until [`Dashboard::refresh`].
    pub async fn seed(&self) -> Result<SeedResult> {
        self.client.seed().await
    }

    /// Append generated records. Cached panels stay until [`Dashboard::refresh`].
    pub async fn add_more(&self, count: Option<u64>) -> Result<AddMoreResult> {
        self.client.add_more(count).await
    }

    /// Drop cached panels so the next read hits the server
    pub fn refresh(&self) {
        self.client.clear_cache();
    }
}

fn degrade<T: Default>(panel: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(panel, error = %e, "Dashboard panel unavailable, showing empty data");
        T::default()
    })
}
