use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub server_time: DateTime<Utc>,
    pub version: &'static str,
}

/// Liveness check for dashboards and load balancers.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Embryotech API is running",
        server_time: state.clock.now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
