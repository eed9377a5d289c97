//! Sample data handlers
//!
//! Reseed and add-more hold the state's seed lock, so two writers never
//! interleave. Readers are not blocked and may observe a partially seeded
//! store.

use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use connex_core::SummaryStats;
use connex_store::seed::{self, SampleGenerator, DEFAULT_ADD_COUNT};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, StoreResultExt};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub records_inserted: u64,
    pub stats: SummaryStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMoreResponse {
    pub success: bool,
    pub message: String,
    pub records_added: u64,
}

/// POST /data/seed
pub async fn seed_data(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let _guard = state.seed_lock.lock().await;
    let cfg = &state.config.seed;
    info!(count = cfg.record_count, "Data seeding requested");

    let mut generator = SampleGenerator::new();
    let report = seed::reseed(
        state.store(),
        &mut generator,
        cfg.record_count,
        cfg.batch_size,
    )
    .await
    .context("Failed to seed database")?;

    Ok(Json(SeedResponse {
        success: true,
        message: "Database seeded successfully".to_string(),
        records_inserted: report.records_inserted,
        stats: report.stats,
    }))
}

/// POST /data/add-more
///
/// Body `{"count": N}`; `count` may be a number or a numeric string and
/// defaults to 1000.
pub async fn add_more_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AddMoreResponse>, ApiError> {
    let count = parse_count(&body, state.config.seed.max_add_count)?;

    let _guard = state.seed_lock.lock().await;
    let mut generator = SampleGenerator::new();
    let added = seed::append(state.store(), &mut generator, count)
        .await
        .context("Failed to add more data")?;

    Ok(Json(AddMoreResponse {
        success: true,
        message: format!("Added {} new records successfully", added),
        records_added: added,
    }))
}

fn parse_count(body: &[u8], max: usize) -> Result<usize, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DEFAULT_ADD_COUNT);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    let count = match value.get("count") {
        None | Some(Value::Null) => return Ok(DEFAULT_ADD_COUNT),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    match count {
        Some(n) if n >= 1 && n <= max as u64 => Ok(n as usize),
        _ => Err(ApiError::BadRequest(format!(
            "count must be an integer between 1 and {}",
            max
        ))),
    }
}
