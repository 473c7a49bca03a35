//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::error::{Result, ServerError};
use super::models::{HealthResponse, PredictionRequest, PredictionResponse};
use super::state::AppState;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "house-price-api";

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.started_at);
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now.timestamp_micros() as f64 / 1e6,
        uptime_secs: uptime.num_microseconds().unwrap_or(i64::MAX).max(0) as f64 / 1e6,
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(request) = payload.map_err(|e| ServerError::Validation(e.body_text()))?;
    let features = request.validate()?;

    let prediction = state.predictor.predict(&features)?;
    Ok(Json(prediction.into()))
}
