use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{
    create_parameter, delete_parameter, list_batches, list_companies, list_parameters,
    update_parameter,
};
use crate::state::AppState;

/// Administrator-only parameter routes.
pub fn init_parameters_router() -> Router<AppState> {
    Router::new()
        .route("/parametros", get(list_parameters).post(create_parameter))
        .route(
            "/parametros/{id}",
            put(update_parameter).delete(delete_parameter),
        )
        .route("/empresas", get(list_companies))
}

/// Batch codes are open to every authenticated user.
pub fn init_batches_router() -> Router<AppState> {
    Router::new().route("/lotes", get(list_batches))
}
