use axum::{extract::FromRequestParts, http::request::Parts};
use embryotech_core::AppError;
use embryotech_models::User;

use crate::middleware::guard::{Access, authorize};
use crate::state::AppState;

/// Extractor for any authenticated caller.
///
/// Rejects with `unauthenticated` before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Access::Authenticated)
            .await
            .map(AuthUser)
    }
}
