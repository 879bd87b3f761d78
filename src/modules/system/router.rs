use axum::{Router, routing::get};

use super::controller::status;
use crate::state::AppState;

pub fn init_system_router() -> Router<AppState> {
    Router::new()
        .route("/api", get(status))
        .route("/api/", get(status))
}
