use axum::{Json, extract::State};
use embryotech_core::AppError;
use embryotech_models::{AuditLog, AuditLogFilter, AuditQuery};
use tracing::instrument;

use crate::state::AppState;
use crate::validator::AppQuery;

/// Newest entries first, filtered by actor, action substring and time range.
///
/// `limite` defaults to the configured page size and is capped by the
/// configured maximum.
#[instrument(skip_all)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<AuditLogFilter>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    let limit = state.audit_config.effective_limit(filter.limit);
    let query = AuditQuery::from_filter(filter, limit);

    state.recorder.query(&query).await.map(Json)
}
