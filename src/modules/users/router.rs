use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{change_password, list_users, set_admin};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/usuarios", get(list_users))
        .route("/usuarios/{id}/senha", put(change_password))
        .route("/usuarios/{id}/admin", put(set_admin))
}
