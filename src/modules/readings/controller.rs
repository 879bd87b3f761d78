use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use embryotech_core::AppError;
use embryotech_models::audit::targets;
use embryotech_models::{
    AuditAction, CreateReadingsPayload, MessageResponse, Reading, ReadingFilter, ReadingId,
    UpdateReadingDto,
};
use serde_json::json;
use tracing::instrument;

use crate::audit::AuditEvent;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientIp;
use crate::modules::readings::service::ReadingService;
use crate::state::AppState;
use crate::validator::{AppJson, AppQuery};

/// Store one reading or an array of them.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_readings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    payload: Result<AppJson<CreateReadingsPayload>, AppError>,
) -> Result<(StatusCode, Json<Vec<Reading>>), AppError> {
    let result = match payload {
        Ok(AppJson(payload)) => ReadingService::create(state.readings.as_ref(), payload).await,
        Err(err) => Err(err),
    };

    let event = AuditEvent::new(AuditAction::Create)
        .actor(&user)
        .target(targets::READINGS)
        .ip(ip);
    let event = match &result {
        Ok(created) => {
            let ids: Vec<i64> = created.iter().map(|r| r.id.into_inner()).collect();
            let event = match ids.as_slice() {
                [single] => event.target_id(*single),
                _ => event,
            };
            event
                .detail(json!({ "quantidade": created.len(), "ids": ids }))
                .status(StatusCode::CREATED)
        }
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|created| (StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all)]
pub async fn list_readings(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    AppQuery(filter): AppQuery<ReadingFilter>,
) -> Result<Json<Vec<Reading>>, AppError> {
    ReadingService::list(state.readings.as_ref(), filter)
        .await
        .map(Json)
}

/// Partial update, audited with the values before and after.
#[instrument(skip_all, fields(reading_id = id))]
pub async fn update_reading(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
    payload: Result<AppJson<UpdateReadingDto>, AppError>,
) -> Result<Json<Reading>, AppError> {
    let result = match payload {
        Ok(AppJson(dto)) => {
            ReadingService::update(state.readings.as_ref(), ReadingId::new(id), dto).await
        }
        Err(err) => Err(err),
    };

    let event = AuditEvent::new(AuditAction::Update)
        .actor(&user)
        .target(targets::READINGS)
        .target_id(id)
        .ip(ip);
    let event = match &result {
        Ok((before, after)) => event.detail(json!({ "antes": before, "depois": after })),
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|(_, after)| Json(after))
}

#[instrument(skip_all, fields(reading_id = id))]
pub async fn delete_reading(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = ReadingService::delete(state.readings.as_ref(), ReadingId::new(id)).await;

    let event = AuditEvent::new(AuditAction::Delete)
        .actor(&user)
        .target(targets::READINGS)
        .target_id(id)
        .ip(ip);
    let event = match &result {
        Ok(deleted) => event.detail(json!({ "removido": deleted })),
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|_| Json(MessageResponse::new("Reading deleted")))
}
