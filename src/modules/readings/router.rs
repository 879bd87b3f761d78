use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{create_readings, delete_reading, list_readings, update_reading};
use crate::state::AppState;

pub fn init_readings_router() -> Router<AppState> {
    Router::new()
        .route("/leituras", get(list_readings).post(create_readings))
        .route("/leituras/{id}", put(update_reading).delete(delete_reading))
}
