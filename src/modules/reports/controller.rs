use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use embryotech_core::AppError;
use embryotech_models::{
    AuditAction, AuditLogFilter, ReadingReportParams, User, UserReportParams,
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::audit::AuditEvent;
use crate::metrics::track_report_exported;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientIp;
use crate::modules::reports::service::{ReadingReport, RenderedReport, ReportService};
use crate::state::AppState;
use crate::validator::AppQuery;

#[instrument(skip_all)]
pub async fn readings_report(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ReadingReportParams>,
) -> Result<Json<ReadingReport>, AppError> {
    ReportService::readings(&state, params).await.map(Json)
}

/// Records the `EXPORT` entry and turns the rendered report into a download.
async fn export(
    state: &AppState,
    user: &User,
    ip: Option<String>,
    report: &'static str,
    filters: Value,
    result: Result<RenderedReport, AppError>,
) -> Result<Response, AppError> {
    let event = AuditEvent::new(AuditAction::Export)
        .actor(user)
        .ip(ip);
    let event = match &result {
        Ok(rendered) => event.detail(json!({
            "relatorio": rendered.name,
            "linhas": rendered.rows,
            "filtros": filters,
        })),
        Err(err) => event
            .detail(json!({ "relatorio": report, "filtros": filters }))
            .failed(err),
    };
    state.recorder.record(event).await;

    let rendered = result?;
    track_report_exported(report);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.file_name),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn readings_pdf(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    AppQuery(params): AppQuery<ReadingReportParams>,
) -> Result<Response, AppError> {
    let filters = json!({
        "lote": params.batch,
        "data_inicio": params.from,
        "data_fim": params.to,
    });
    let result = ReportService::readings_pdf(&state, params).await;
    export(&state, &user, ip, "leituras", filters, result).await
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn audit_pdf(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    AppQuery(filter): AppQuery<AuditLogFilter>,
) -> Result<Response, AppError> {
    let filters = json!({
        "usuario_id": filter.actor_id,
        "data_inicio": filter.from,
        "data_fim": filter.to,
    });
    let result = ReportService::audit_pdf(&state, filter).await;
    export(&state, &user, ip, "auditoria", filters, result).await
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn users_pdf(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ClientIp(ip): ClientIp,
    AppQuery(params): AppQuery<UserReportParams>,
) -> Result<Response, AppError> {
    let filters = json!({ "tipo": params.kind });
    let result = ReportService::users_pdf(&state, params).await;
    export(&state, &user, ip, "usuarios", filters, result).await
}
