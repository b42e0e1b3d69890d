//! HTTP API for the Keygate key validation service.

mod error;
mod handlers;

use std::sync::Arc;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use keygate_license::{KeyStore, UsageLog, Validator};
use tower_http::cors::{Any, CorsLayer};

pub use error::{ApiError, ErrorBody};
pub use handlers::{LogUsageRequest, StatusResponse};

/// Shared handler state. The store behind both fields lives for the whole process.
#[derive(Clone)]
pub struct AppState {
    pub validator: Validator<dyn KeyStore>,
    pub usage: Arc<dyn UsageLog>,
}

impl AppState {
    /// Builds state from one store serving both keys and usage logs.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: KeyStore + UsageLog + 'static,
    {
        let keys: Arc<dyn KeyStore> = store.clone();
        Self {
            validator: Validator::new(keys),
            usage: store,
        }
    }
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/check-key", post(handlers::check_key))
        .route("/api/log-usage", post(handlers::log_usage_handler))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
