//! connex-api - ConnexView HTTP JSON API
//!
//! This crate exposes the query, pagination and summary engines over HTTP.
//! It is store-agnostic: any [`connex_core::LogStore`] can back it.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use connex_api::{create_router, AppState};
//! use connex_store::MemoryStore;
//!
//! let state = AppState::with_store(Arc::new(MemoryStore::new()));
//! let router = create_router(state);
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod state;

pub use config::{ApiConfig, Environment, RateLimitConfig, SeedConfig};
pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use state::AppState;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Canonical API prefix
pub const API_PREFIX: &str = "/api/v1";
/// Unversioned prefix kept for older clients
pub const LEGACY_API_PREFIX: &str = "/api";

fn api_routes() -> Router<AppState> {
    Router::new()
        // Dashboard routes
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/dashboard/logs", get(handlers::interfaces::list_logs))
        .route("/dashboard/realtime", get(handlers::dashboard::get_realtime))
        .route(
            "/dashboard/performance",
            get(handlers::dashboard::get_performance),
        )
        .route("/dashboard/health", get(handlers::dashboard::get_health))
        // Interface routes
        .route(
            "/interfaces/logs",
            get(handlers::interfaces::list_logs).post(handlers::interfaces::record_log),
        )
        .route("/interfaces/names", get(handlers::interfaces::list_names))
        .route("/interfaces/keys", get(handlers::interfaces::list_keys))
        // Sample data routes
        .route("/data/seed", post(handlers::data::seed_data))
        .route("/data/add-more", post(handlers::data::add_more_data))
}

/// Create the ConnexView API router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(handlers::meta::root))
        .nest(API_PREFIX, api_routes())
        .nest(LEGACY_API_PREFIX, api_routes())
        .fallback(handlers::meta::not_found);

    if state.config.rate_limit.enabled {
        router = router.layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ));
    }
    if !state.config.environment.is_production() {
        router = router.layer(middleware::map_response(error::attach_error_details));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
