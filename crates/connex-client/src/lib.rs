//! ConnexView Client Library
//!
//! Provides a typed HTTP client for the ConnexView API, a TTL response
//! cache shared by its read endpoints, and the filter state behind the
//! dashboard's log browser.
//!
//! # Example
//!
//! ```rust,no_run
//! use connex_client::{ConnexClient, LogsParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConnexClient::new("http://localhost:8000")?;
//!
//!     // Labels and tokens are both accepted
//!     let summary = client.summary("Last 7 days").await?;
//!     println!("{} executions", summary.summary.total_executions);
//!
//!     let page = client.logs(&LogsParams::default()).await?;
//!     println!("page {} of {}", page.pagination.current_page, page.pagination.total_pages);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! ```rust,ignore
//! use connex_client::testing::TestServer;
//! use connex_api::{create_router, AppState};
//!
//! let server = TestServer::start(create_router(state)).await?;
//! let names = server.client.interface_names().await?;
//! ```

pub mod cache;
mod client;
pub mod dashboard;
mod error;
pub mod state;
pub mod testing;
pub mod time_range;
mod types;

pub use cache::ResponseCache;
pub use client::ConnexClient;
pub use dashboard::{Dashboard, LogsView};
pub use error::{ConnexClientError, Result};
pub use state::DashboardFilters;
pub use types::*;

// Re-export core types for convenience
pub use connex_core::{ExecutionLog, ExecutionStatus, NewExecutionLog, Pagination};
