//! Admin-only access.
//!
//! Two forms of the same check:
//! 1. [`require_admin`], a route layer guarding a whole router
//! 2. [`RequireAdmin`], an extractor for a single handler
//!
//! Both reject non-admins with `forbidden` and record an `ACCESS_DENIED`
//! entry. Inside a router already guarded by the layer, `AuthUser` reuses the
//! resolved caller instead of checking again.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use embryotech_core::AppError;
use embryotech_models::User;

use crate::middleware::guard::{Access, authorize};
use crate::state::AppState;

/// Route layer that only lets administrators through.
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/usuarios", get(list_users))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    match authorize(&mut parts, &state, Access::Admin).await {
        Ok(_) => next.run(Request::from_parts(parts, body)).await,
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Access::Admin)
            .await
            .map(RequireAdmin)
    }
}
