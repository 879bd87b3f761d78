use axum::{Json, extract::State, http::StatusCode};
use embryotech_core::AppError;
use embryotech_models::audit::targets;
use embryotech_models::{
    AuditAction, LoginRequest, LoginResponse, MessageResponse, RegisterUserDto, User,
};
use serde_json::json;
use tracing::instrument;

use crate::audit::AuditEvent;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientIp;
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::AppJson;

/// Register a new (non-admin) user.
///
/// Every attempt is audited: `CREATE` on success, `CREATE_FAILED` otherwise.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: Result<AppJson<RegisterUserDto>, AppError>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let attempted = payload
        .as_ref()
        .ok()
        .map(|AppJson(dto)| dto.username.trim().to_string());

    let result = match payload {
        Ok(AppJson(dto)) => AuthService::register(&state, dto).await,
        Err(err) => Err(err),
    };

    let event = AuditEvent::new(AuditAction::Create)
        .target(targets::USERS)
        .ip(ip)
        .detail(json!({ "username": attempted }));
    let event = match &result {
        Ok(user) => event
            .actor(user)
            .target_id(user.id.into_inner())
            .status(StatusCode::CREATED),
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|user| (StatusCode::CREATED, Json(user)))
}

/// Exchange username and password for a bearer token.
///
/// Exactly one `LOGIN` entry per attempt, carrying the response status.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: Result<AppJson<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    let (attempted, result) = match payload {
        Ok(AppJson(dto)) => {
            let attempted = dto.username.trim().to_string();
            (attempted, AuthService::login(&state, &dto).await)
        }
        Err(err) => (String::new(), Err(err)),
    };

    let event = AuditEvent::new(AuditAction::Login)
        .target(targets::SESSION)
        .ip(ip);
    let event = match &result {
        Ok(response) => event.actor(&response.user).status(StatusCode::OK),
        Err(err) if attempted.is_empty() => event.failed(err),
        Err(err) => event.actor_name(attempted).failed(err),
    };
    state.recorder.record(event).await;

    result.map(Json)
}

/// Tokens are stateless, so logging out only records the event. The client
/// discards its token.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AuthUser(user): AuthUser,
) -> Json<MessageResponse> {
    state
        .recorder
        .record(
            AuditEvent::new(AuditAction::Logout)
                .actor(&user)
                .target(targets::SESSION)
                .ip(ip),
        )
        .await;

    Json(MessageResponse::new("Logged out"))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
