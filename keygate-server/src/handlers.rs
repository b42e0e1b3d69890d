//! Route handlers.

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use keygate_license::{check, log_usage, CheckRequest, CheckResponse, LicenseError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Body of `POST /api/log-usage`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LogUsageRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, rename = "placeName")]
    pub place_name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

/// Simple `{"status": ...}` acknowledgement.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

pub(crate) async fn check_key(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // Reject before leaving the async context.
    request.require()?;

    let validator = state.validator.clone();
    let response = tokio::task::spawn_blocking(move || check(&validator, &request))
        .await
        .map_err(|e| LicenseError::Internal(format!("validation task failed: {e}")))??;

    Ok(Json(response))
}

pub(crate) async fn log_usage_handler(
    State(state): State<AppState>,
    payload: Result<Json<LogUsageRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let Some(key) = request.key.filter(|k| !k.is_empty()) else {
        return Err(LicenseError::MissingFields("key".to_string()).into());
    };

    let sink = state.usage.clone();
    let place_name = request.place_name;
    let ip = request.ip;
    let written = tokio::task::spawn_blocking(move || {
        log_usage(sink.as_ref(), &key, place_name.as_deref(), ip.as_deref());
    })
    .await;
    if let Err(e) = written {
        warn!(error = %e, "usage logging task failed");
    }

    Ok(Json(StatusResponse {
        status: "success".to_string(),
    }))
}

pub(crate) async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}
