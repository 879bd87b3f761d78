//! The access control chain every protected route runs through.
//!
//! ```text
//! header present? ── no ──> unauthenticated
//! Bearer <token>? ── no ──> unauthenticated
//! token verifies? ── no ──> unauthenticated
//! user exists?    ── no ──> unauthenticated
//! admin required and not admin ──> forbidden (audited as ACCESS_DENIED)
//! otherwise the request proceeds with the resolved user
//! ```
//!
//! Each step returns early. Authentication failures are logged with their
//! internal reason but all produce the same response.

use axum::extract::MatchedPath;
use axum::http::{header, request::Parts};
use embryotech_auth::{TokenError, parse_bearer};
use embryotech_core::AppError;
use embryotech_models::{AuditAction, User, UserId};
use serde_json::json;
use tracing::{debug, warn};

use crate::audit::AuditEvent;
use crate::metrics::{track_access_denied, track_authentication_rejected};
use crate::middleware::client::client_ip;
use crate::state::AppState;

pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin access required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authenticated,
    Admin,
}

/// Resolved caller, cached in request extensions once the chain has run.
#[derive(Debug, Clone)]
struct Authenticated(User);

/// Runs the chain for `access` and returns the caller.
pub async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    access: Access,
) -> Result<User, AppError> {
    let user = match parts.extensions.get::<Authenticated>() {
        Some(Authenticated(user)) => user.clone(),
        None => {
            let user = authenticate(parts, state).await?;
            parts.extensions.insert(Authenticated(user.clone()));
            user
        }
    };

    if access == Access::Admin && !user.is_admin {
        deny(parts, state, &user).await;
        return Err(AppError::forbidden(ADMIN_REQUIRED_MESSAGE));
    }

    Ok(user)
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let header = match parts.headers.get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| reject(TokenError::MalformedHeader))?),
        None => None,
    };

    let token = parse_bearer(header).map_err(reject)?;
    let identity = state.tokens.verify(token).map_err(reject)?;

    let user = state
        .users
        .find_by_id(UserId::new(identity.user_id))
        .await?
        .ok_or_else(|| reject(TokenError::UnknownUser))?;

    debug!(user_id = %user.id, "request authenticated");
    Ok(user)
}

fn reject(err: TokenError) -> AppError {
    warn!(reason = err.reason(), "authentication rejected");
    track_authentication_rejected(err.reason());
    err.into()
}

async fn deny(parts: &Parts, state: &AppState, user: &User) {
    let path = parts
        .extensions
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    warn!(user_id = %user.id, path = %path, "admin route denied");
    track_access_denied(&path);

    state
        .recorder
        .record(
            AuditEvent::new(AuditAction::AccessDenied)
                .actor(user)
                .detail(json!({ "metodo": parts.method.as_str(), "rota": path }))
                .ip(client_ip(parts))
                .status(axum::http::StatusCode::FORBIDDEN),
        )
        .await;
}
