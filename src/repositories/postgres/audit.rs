use anyhow::Context;
use async_trait::async_trait;
use embryotech_core::AppError;
use embryotech_db::PgPool;
use embryotech_models::{AuditLog, AuditQuery, NewAuditLog};

use crate::repositories::AuditRepository;

const AUDIT_COLUMNS: &str = "id, actor_id, actor_name, action, target_type, target_id, detail, \
     ip_address, status, occurred_at";

/// `$2` is matched as a literal, case-insensitive substring. `%` and `_` in
/// the caller's text are not wildcards.
const AUDIT_FILTER: &str = "($1::bigint IS NULL OR actor_id = $1)
              AND ($2::text IS NULL OR strpos(lower(action), lower($2)) > 0)
              AND ($3::timestamptz IS NULL OR occurred_at >= $3)
              AND ($4::timestamptz IS NULL OR occurred_at <= $4)";

pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog, AppError> {
        sqlx::query_as::<_, AuditLog>(&format!(
            r#"
            INSERT INTO audit_logs (actor_id, actor_name, action, target_type, target_id,
                                    detail, ip_address, status, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {AUDIT_COLUMNS}
            "#
        ))
        .bind(entry.actor_id)
        .bind(&entry.actor_name)
        .bind(entry.action.as_str())
        .bind(&entry.target_type)
        .bind(entry.target_id)
        .bind(&entry.detail)
        .bind(&entry.ip_address)
        .bind(entry.status)
        .bind(entry.occurred_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to append audit entry")
        .map_err(AppError::database)
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLog>, AppError> {
        sqlx::query_as::<_, AuditLog>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS} FROM audit_logs
            WHERE {AUDIT_FILTER}
            ORDER BY occurred_at DESC, id DESC
            LIMIT $5
            "#
        ))
        .bind(query.actor_id)
        .bind(query.action.as_deref())
        .bind(query.from)
        .bind(query.to)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query audit log")
        .map_err(AppError::database)
    }
}

#[cfg(test)]
mod tests {
    use super::AUDIT_FILTER;

    #[test]
    fn test_action_filter_has_no_pattern_matching() {
        assert!(AUDIT_FILTER.contains("strpos(lower(action), lower($2))"));
        assert!(!AUDIT_FILTER.to_ascii_uppercase().contains("LIKE"));
    }
}
