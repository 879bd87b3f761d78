//! Audit trail entries.
//!
//! Entries are append-only. Nothing in the application updates or deletes
//! them once written.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use embryotech_core::serde::{
    deserialize_optional_end, deserialize_optional_i64, deserialize_optional_start,
    deserialize_optional_string,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{AuditLogId, UserId};

/// Action codes written to `audit_logs.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    Logout,
    Create,
    Update,
    Delete,
    CreateFailed,
    UpdateFailed,
    DeleteFailed,
    AccessDenied,
    UpdatePassword,
    PromoteAdmin,
    RevokeAdmin,
    Export,
}

impl AuditAction {
    pub const ALL: [AuditAction; 13] = [
        Self::Login,
        Self::Logout,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::CreateFailed,
        Self::UpdateFailed,
        Self::DeleteFailed,
        Self::AccessDenied,
        Self::UpdatePassword,
        Self::PromoteAdmin,
        Self::RevokeAdmin,
        Self::Export,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::UpdatePassword => "UPDATE_PASSWORD",
            Self::PromoteAdmin => "PROMOTE_ADMIN",
            Self::RevokeAdmin => "REVOKE_ADMIN",
            Self::Export => "EXPORT",
        }
    }

    /// Code logged when the operation behind this action fails.
    ///
    /// Only create, update and delete have a dedicated failure code.
    pub const fn failed(self) -> Self {
        match self {
            Self::Create => Self::CreateFailed,
            Self::Update => Self::UpdateFailed,
            Self::Delete => Self::DeleteFailed,
            other => other,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown audit action: {s}"))
    }
}

/// Target entity names, matching the public route segments.
pub mod targets {
    pub const USERS: &str = "usuarios";
    pub const READINGS: &str = "leituras";
    pub const PARAMETERS: &str = "parametros";
    pub const SESSION: &str = "sessao";
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AuditLog {
    pub id: AuditLogId,
    #[serde(rename = "usuario_id")]
    pub actor_id: Option<UserId>,
    #[serde(rename = "usuario")]
    pub actor_name: Option<String>,
    #[serde(rename = "acao")]
    pub action: String,
    #[serde(rename = "entidade")]
    pub target_type: Option<String>,
    #[serde(rename = "entidade_id")]
    pub target_id: Option<i64>,
    #[serde(rename = "detalhes")]
    pub detail: Option<serde_json::Value>,
    #[serde(rename = "ip")]
    pub ip_address: Option<String>,
    pub status: i16,
    #[serde(rename = "data_hora")]
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub actor_id: Option<UserId>,
    pub actor_name: Option<String>,
    pub action: AuditAction,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub detail: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub status: i16,
    pub occurred_at: DateTime<Utc>,
}

/// Query string of `GET /api/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogFilter {
    #[serde(default, rename = "usuario_id", deserialize_with = "deserialize_optional_i64")]
    pub actor_id: Option<i64>,
    #[serde(default, rename = "acao", deserialize_with = "deserialize_optional_string")]
    pub action: Option<String>,
    #[serde(
        default,
        rename = "data_inicio",
        deserialize_with = "deserialize_optional_start"
    )]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, rename = "data_fim", deserialize_with = "deserialize_optional_end")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default, rename = "limite", deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

/// Store-level audit query. Results are newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditQuery {
    pub actor_id: Option<UserId>,
    /// Case-insensitive substring of the action code.
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
}

impl AuditQuery {
    pub fn from_filter(filter: AuditLogFilter, limit: i64) -> Self {
        Self {
            actor_id: filter.actor_id.map(UserId::new),
            action: filter.action,
            from: filter.from,
            to: filter.to,
            limit,
        }
    }

    pub fn matches(&self, entry: &AuditLog) -> bool {
        self.actor_id.is_none_or(|id| entry.actor_id == Some(id))
            && self.action.as_ref().is_none_or(|needle| {
                entry
                    .action
                    .to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase())
            })
            && self.from.is_none_or(|from| entry.occurred_at >= from)
            && self.to.is_none_or(|to| entry.occurred_at <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(action: AuditAction, actor: Option<i64>, hour: u32) -> AuditLog {
        AuditLog {
            id: AuditLogId::new(1),
            actor_id: actor.map(UserId::new),
            actor_name: None,
            action: action.as_str().to_string(),
            target_type: None,
            target_id: None,
            detail: None,
            ip_address: None,
            status: 200,
            occurred_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(AuditAction::CreateFailed.as_str(), "CREATE_FAILED");
        assert_eq!(
            serde_json::to_value(AuditAction::AccessDenied).unwrap(),
            "ACCESS_DENIED"
        );
        assert_eq!("revoke_admin".parse::<AuditAction>(), Ok(AuditAction::RevokeAdmin));
        assert!("DROP_TABLE".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_failed_variant() {
        assert_eq!(AuditAction::Create.failed(), AuditAction::CreateFailed);
        assert_eq!(AuditAction::Update.failed(), AuditAction::UpdateFailed);
        assert_eq!(AuditAction::Delete.failed(), AuditAction::DeleteFailed);
        assert_eq!(AuditAction::Login.failed(), AuditAction::Login);
        assert_eq!(AuditAction::PromoteAdmin.failed(), AuditAction::PromoteAdmin);
    }

    #[test]
    fn test_filter_parses_query_names() {
        let filter: AuditLogFilter = serde_json::from_value(serde_json::json!({
            "usuario_id": "3",
            "acao": "fail",
            "data_inicio": "2024-05-01",
            "data_fim": "2024-05-01",
            "limite": "20"
        }))
        .unwrap();
        assert_eq!(filter.actor_id, Some(3));
        assert_eq!(filter.limit, Some(20));

        let query = AuditQuery::from_filter(filter, 20);
        assert!(query.matches(&entry(AuditAction::CreateFailed, Some(3), 23)));
        assert!(!query.matches(&entry(AuditAction::Create, Some(3), 10)));
        assert!(!query.matches(&entry(AuditAction::UpdateFailed, Some(4), 10)));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = AuditQuery::from_filter(AuditLogFilter::default(), 100);
        assert!(query.matches(&entry(AuditAction::Login, None, 0)));
    }

    #[test]
    fn test_serializes_wire_names() {
        let json = serde_json::to_value(entry(AuditAction::Login, Some(1), 8)).unwrap();
        assert_eq!(json["acao"], "LOGIN");
        assert_eq!(json["usuario_id"], 1);
        assert!(json.get("data_hora").is_some());
    }
}
