use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use embryotech_core::AppError;
use embryotech_models::audit::targets;
use embryotech_models::{
    AuditAction, BatchFilter, CreateParameterDto, MessageResponse, Parameter, ParameterFilter,
    ParameterId, UpdateParameterDto,
};
use serde_json::json;
use tracing::instrument;

use crate::audit::AuditEvent;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientIp;
use crate::modules::parameters::service::ParameterService;
use crate::state::AppState;
use crate::validator::{AppJson, AppQuery};

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_parameter(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    payload: Result<AppJson<CreateParameterDto>, AppError>,
) -> Result<(StatusCode, Json<Parameter>), AppError> {
    let result = match payload {
        Ok(AppJson(dto)) => ParameterService::create(state.parameters.as_ref(), dto).await,
        Err(err) => Err(err),
    };

    let event = AuditEvent::new(AuditAction::Create)
        .actor(&user)
        .target(targets::PARAMETERS)
        .ip(ip);
    let event = match &result {
        Ok(created) => event
            .target_id(created.id.into_inner())
            .detail(json!({ "empresa": created.company, "lote": created.batch }))
            .status(StatusCode::CREATED),
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|created| (StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all)]
pub async fn list_parameters(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ParameterFilter>,
) -> Result<Json<Vec<Parameter>>, AppError> {
    ParameterService::list(state.parameters.as_ref(), filter)
        .await
        .map(Json)
}

#[instrument(skip_all, fields(parameter_id = id))]
pub async fn update_parameter(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
    payload: Result<AppJson<UpdateParameterDto>, AppError>,
) -> Result<Json<Parameter>, AppError> {
    let result = match payload {
        Ok(AppJson(dto)) => {
            ParameterService::update(state.parameters.as_ref(), ParameterId::new(id), dto).await
        }
        Err(err) => Err(err),
    };

    let event = AuditEvent::new(AuditAction::Update)
        .actor(&user)
        .target(targets::PARAMETERS)
        .target_id(id)
        .ip(ip);
    let event = match &result {
        Ok((before, after)) => event.detail(json!({ "antes": before, "depois": after })),
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|(_, after)| Json(after))
}

#[instrument(skip_all, fields(parameter_id = id))]
pub async fn delete_parameter(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = ParameterService::delete(state.parameters.as_ref(), ParameterId::new(id)).await;

    let event = AuditEvent::new(AuditAction::Delete)
        .actor(&user)
        .target(targets::PARAMETERS)
        .target_id(id)
        .ip(ip);
    let event = match &result {
        Ok(deleted) => event.detail(json!({ "removido": deleted })),
        Err(err) => event.failed(err),
    };
    state.recorder.record(event).await;

    result.map(|_| Json(MessageResponse::new("Parameter deleted")))
}

#[instrument(skip_all)]
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    ParameterService::companies(state.parameters.as_ref())
        .await
        .map(Json)
}

#[instrument(skip_all)]
pub async fn list_batches(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    AppQuery(filter): AppQuery<BatchFilter>,
) -> Result<Json<Vec<String>>, AppError> {
    ParameterService::batches(state.parameters.as_ref(), filter)
        .await
        .map(Json)
}
