// HTTP request handlers
use crate::application::live_window::RangeOutcome;
use crate::domain::chart::{ChartId, DashboardView};
use crate::domain::range::{RangeError, RangeOrigin, VisibleRange};
use crate::domain::sample::Sample;
use crate::presentation::app_state::AppState;
use crate::presentation::error::{ApiError, ApiResult};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Sample as served by the data endpoints, with its display label
#[derive(Serialize)]
pub struct SampleRecord {
    #[serde(flatten)]
    pub sample: Sample,
    pub time: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,
    #[serde(default)]
    pub origin: RangeOrigin,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub range: VisibleRange,
    pub live: bool,
    pub displayed_length: usize,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn ensure_configured(state: &AppState) -> ApiResult<()> {
    if state.repository.is_configured() {
        Ok(())
    } else {
        Err(ApiError::SourceNotConfigured)
    }
}

/// All known samples, oldest first
pub async fn all_data(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SampleRecord>>> {
    ensure_configured(&state)?;

    let service = &state.dashboard_service;
    let records = service
        .history()
        .await
        .iter()
        .map(|sample| SampleRecord {
            sample: sample.clone(),
            time: service.time_label(sample.timestamp),
        })
        .collect();

    Ok(Json(records))
}

/// Newest sample, or `{}` when there is none yet
pub async fn last_data(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    ensure_configured(&state)?;

    let service = &state.dashboard_service;
    let body = match service.latest().await {
        Some(sample) => {
            let time = service.time_label(sample.timestamp);
            let record = SampleRecord { sample, time };
            json!(record)
        }
        None => json!({}),
    };

    Ok(Json(body))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "running",
        "sourceConfigured": state.repository.is_configured(),
    }))
}

pub async fn predict() -> Json<Value> {
    Json(json!({
        "message": "Prediction module not yet implemented.",
        "status": "coming_soon",
    }))
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.dashboard_service.view().await)
}

/// Range-change notification from a chart's brush widget
pub async fn change_range(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    request: Result<Json<RangeRequest>, JsonRejection>,
) -> ApiResult<Json<RangeResponse>> {
    let chart = ChartId::new(id);
    let service = &state.dashboard_service;

    let change = match request {
        Ok(Json(request)) => {
            match VisibleRange::from_signed(request.start_index, request.end_index) {
                Ok(range) => service.change_range(&chart, range, request.origin).await,
                Err(e) => service.reject_range(&chart, e).await,
            }
        }
        Err(rejection) => {
            tracing::debug!("Unreadable range request for {}: {}", chart, rejection.body_text());
            service.reject_range(&chart, RangeError::Malformed).await
        }
    };

    let reason = match &change.outcome {
        RangeOutcome::UnknownChart => return Err(ApiError::ChartNotFound(chart.to_string())),
        RangeOutcome::Rejected(e) => Some(e.to_string()),
        _ => None,
    };

    Ok(Json(RangeResponse {
        outcome: change.outcome.as_str(),
        reason,
        range: change.range.unwrap_or_default(),
        live: change.live.unwrap_or(true),
        displayed_length: change.displayed_length,
    }))
}
