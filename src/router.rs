use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::role::require_admin;
use crate::modules::audit_logs::router::init_audit_logs_router;
use crate::modules::auth::router::{init_credentials_router, init_session_router};
use crate::modules::parameters::router::{init_batches_router, init_parameters_router};
use crate::modules::readings::router::init_readings_router;
use crate::modules::reports::router::init_reports_router;
use crate::modules::system::router::init_system_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

fn cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    // Browsers refuse credentials together with a wildcard origin.
    if state.cors_config.allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let credentials = match state.rate_limit_config.auth_governor_config() {
        Some(governor) => init_credentials_router().layer(GovernorLayer::new(Arc::new(governor))),
        None => init_credentials_router(),
    };

    let authenticated = Router::new()
        .merge(init_session_router())
        .merge(init_readings_router())
        .merge(init_batches_router());

    let admin = Router::new()
        .merge(init_parameters_router())
        .merge(init_users_router())
        .merge(init_audit_logs_router())
        .merge(init_reports_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(init_system_router())
        .nest(
            "/api",
            Router::new()
                .merge(credentials)
                .merge(authenticated)
                .merge(admin),
        )
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
