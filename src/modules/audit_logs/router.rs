use axum::{Router, routing::get};

use super::controller::list_audit_logs;
use crate::state::AppState;

pub fn init_audit_logs_router() -> Router<AppState> {
    Router::new().route("/logs", get(list_audit_logs))
}
