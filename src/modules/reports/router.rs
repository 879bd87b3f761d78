use axum::{Router, routing::get};

use super::controller::{audit_pdf, readings_pdf, readings_report, users_pdf};
use crate::state::AppState;

pub fn init_reports_router() -> Router<AppState> {
    Router::new()
        .route("/relatorio/leituras", get(readings_report))
        .route("/relatorio/leituras/pdf", get(readings_pdf))
        .route("/relatorio/auditoria/pdf", get(audit_pdf))
        .route("/relatorio/usuarios/pdf", get(users_pdf))
}
