use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use embryotech_core::AppError;
use embryotech_models::audit::targets;
use embryotech_models::{
    AuditAction, ChangePasswordDto, MessageResponse, SetAdminDto, User, UserId,
};
use serde_json::json;
use tracing::instrument;

use crate::audit::AuditEvent;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientIp;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::AppJson;

#[instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    UserService::list(&state).await.map(Json)
}

/// Set another user's password. Audited as `UPDATE_PASSWORD`.
#[instrument(skip_all, fields(target_id = id))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
    payload: Result<AppJson<ChangePasswordDto>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = match payload {
        Ok(AppJson(dto)) => UserService::change_password(&state, UserId::new(id), dto).await,
        Err(err) => Err(err),
    };

    state
        .recorder
        .record(
            AuditEvent::new(AuditAction::UpdatePassword)
                .actor(&actor)
                .target(targets::USERS)
                .target_id(id)
                .ip(ip)
                .outcome(&result, StatusCode::OK),
        )
        .await;

    result.map(|_| Json(MessageResponse::new("Password updated")))
}

/// Grant or revoke the admin flag. Audited as `PROMOTE_ADMIN` or
/// `REVOKE_ADMIN` depending on the requested value.
#[instrument(skip_all, fields(target_id = id))]
pub async fn set_admin(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
    payload: Result<AppJson<SetAdminDto>, AppError>,
) -> Result<Json<User>, AppError> {
    let requested = payload.as_ref().ok().map(|AppJson(dto)| dto.is_admin);
    let action = match requested {
        Some(false) => AuditAction::RevokeAdmin,
        _ => AuditAction::PromoteAdmin,
    };

    let result = match payload {
        Ok(AppJson(dto)) => {
            UserService::set_admin(&state, &actor, UserId::new(id), dto.is_admin).await
        }
        Err(err) => Err(err),
    };

    let event = AuditEvent::new(action)
        .actor(&actor)
        .target(targets::USERS)
        .target_id(id)
        .ip(ip);
    let event = match &result {
        Ok(change) => event.detail(json!({
            "antes": { "is_admin": change.before },
            "depois": { "is_admin": change.user.is_admin },
        })),
        Err(err) => event.detail(json!({ "is_admin": requested })).failed(err),
    };
    state.recorder.record(event).await;

    result.map(|change| Json(change.user))
}
