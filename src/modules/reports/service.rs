use chrono::{DateTime, Utc};
use embryotech_core::AppError;
use embryotech_models::{
    AuditLogFilter, AuditQuery, Reading, ReadingQuery, ReadingReportParams, UserKind,
    UserReportParams,
};
use serde::Serialize;

use crate::modules::reports::pdf::{Column, PdfReport};
use crate::state::AppState;

pub const MAX_READINGS_PDF_ROWS: i64 = 1000;
pub const MAX_AUDIT_PDF_ROWS: i64 = 500;

const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// JSON body of `GET /api/relatorio/leituras`.
#[derive(Debug, Serialize)]
pub struct ReadingReport {
    pub lote: Option<String>,
    pub data_inicio: Option<DateTime<Utc>>,
    pub data_fim: Option<DateTime<Utc>>,
    pub total: usize,
    pub leituras: Vec<Reading>,
}

/// A rendered PDF plus what the audit entry needs to know about it.
#[derive(Debug)]
pub struct RenderedReport {
    pub name: &'static str,
    pub file_name: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

fn format_time(at: DateTime<Utc>) -> String {
    format!("{} UTC", at.format(DATE_TIME_FORMAT))
}

fn format_bound(at: Option<DateTime<Utc>>) -> String {
    at.map(format_time).unwrap_or_else(|| "-".to_string())
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.pdf", at.format("%Y%m%d_%H%M%S"))
}

pub struct ReportService;

impl ReportService {
    pub async fn readings(
        state: &AppState,
        params: ReadingReportParams,
    ) -> Result<ReadingReport, AppError> {
        let query = ReadingQuery::from(params);
        let leituras = state.readings.list(&query).await?;

        Ok(ReadingReport {
            lote: query.batch,
            data_inicio: query.from,
            data_fim: query.to,
            total: leituras.len(),
            leituras,
        })
    }

    pub async fn readings_pdf(
        state: &AppState,
        params: ReadingReportParams,
    ) -> Result<RenderedReport, AppError> {
        let query = ReadingQuery {
            limit: Some(MAX_READINGS_PDF_ROWS),
            ..ReadingQuery::from(params)
        };
        let readings = state.readings.list(&query).await?;
        let now = state.clock.now();

        let mut report = PdfReport::new(
            "Relatorio de Leituras",
            vec![
                Column::new("ID", 8),
                Column::new("Lote", 14),
                Column::new("Temp (C)", 9),
                Column::new("Umidade (%)", 11),
                Column::new("Pressao", 9),
                Column::new("Inicio", 23),
                Column::new("Fim", 23),
            ],
        )
        .meta("Gerado em", format_time(now))
        .meta("Registros", readings.len().to_string())
        .meta("Lote", query.batch.clone().unwrap_or_else(|| "todos".to_string()))
        .meta(
            "Periodo",
            format!("{} a {}", format_bound(query.from), format_bound(query.to)),
        );

        for reading in &readings {
            report.row(vec![
                reading.id.to_string(),
                reading.batch.clone(),
                format!("{:.2}", reading.temperature),
                format!("{:.2}", reading.humidity),
                format_optional(reading.pressure),
                format_time(reading.started_at),
                format_time(reading.ended_at),
            ]);
        }

        Ok(RenderedReport {
            name: "leituras",
            file_name: file_name("relatorio_leituras", now),
            rows: readings.len(),
            bytes: report.render(),
        })
    }

    pub async fn audit_pdf(
        state: &AppState,
        filter: AuditLogFilter,
    ) -> Result<RenderedReport, AppError> {
        let query = AuditQuery::from_filter(
            AuditLogFilter {
                action: None,
                ..filter
            },
            MAX_AUDIT_PDF_ROWS,
        );
        let entries = state.recorder.query(&query).await?;
        let now = state.clock.now();

        let mut report = PdfReport::new(
            "Relatorio de Auditoria",
            vec![
                Column::new("Data/Hora", 23),
                Column::new("Usuario", 16),
                Column::new("Acao", 16),
                Column::new("Entidade", 11),
                Column::new("ID", 7),
                Column::new("Status", 6),
                Column::new("IP", 15),
            ],
        )
        .meta("Gerado em", format_time(now))
        .meta("Registros", entries.len().to_string())
        .meta(
            "Usuario",
            query
                .actor_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "todos".to_string()),
        )
        .meta(
            "Periodo",
            format!("{} a {}", format_bound(query.from), format_bound(query.to)),
        );

        for entry in &entries {
            report.row(vec![
                format_time(entry.occurred_at),
                entry
                    .actor_name
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                entry.action.clone(),
                entry.target_type.clone().unwrap_or_else(|| "-".to_string()),
                entry
                    .target_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                entry.status.to_string(),
                entry.ip_address.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }

        Ok(RenderedReport {
            name: "auditoria",
            file_name: file_name("relatorio_auditoria", now),
            rows: entries.len(),
            bytes: report.render(),
        })
    }

    pub async fn users_pdf(
        state: &AppState,
        params: UserReportParams,
    ) -> Result<RenderedReport, AppError> {
        let users: Vec<_> = state
            .users
            .list()
            .await?
            .into_iter()
            .filter(|user| params.kind.is_none_or(|kind| kind.matches(user)))
            .collect();
        let now = state.clock.now();

        let scope = match params.kind {
            Some(UserKind::Admin) => "administradores",
            Some(UserKind::User) => "usuarios comuns",
            None => "todos",
        };

        let mut report = PdfReport::new(
            "Relatorio de Usuarios",
            vec![
                Column::new("ID", 8),
                Column::new("Usuario", 24),
                Column::new("Email", 36),
                Column::new("Tipo", 8),
                Column::new("Criado em", 23),
            ],
        )
        .meta("Gerado em", format_time(now))
        .meta("Registros", users.len().to_string())
        .meta("Tipo", scope);

        for user in &users {
            report.row(vec![
                user.id.to_string(),
                user.username.clone(),
                user.email.clone(),
                if user.is_admin { "admin" } else { "user" }.to_string(),
                format_time(user.created_at),
            ]);
        }

        Ok(RenderedReport {
            name: "usuarios",
            file_name: file_name("relatorio_usuarios", now),
            rows: users.len(),
            bytes: report.render(),
        })
    }
}
