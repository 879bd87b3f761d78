use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{login, logout, me, register};
use crate::state::AppState;

/// Public credential routes. The caller decides whether to throttle them.
pub fn init_credentials_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn init_session_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
}
