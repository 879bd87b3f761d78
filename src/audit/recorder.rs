use std::sync::Arc;

use axum::http::StatusCode;
use embryotech_core::{AppError, SharedClock};
use embryotech_models::{AuditAction, AuditLog, AuditQuery, NewAuditLog, User};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::metrics::track_audit_write_failure;
use crate::repositories::AuditRepository;

/// One thing worth remembering, before it is timestamped and stored.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub actor_id: Option<i64>,
    pub actor_name: Option<String>,
    pub target_type: Option<&'static str>,
    pub target_id: Option<i64>,
    pub detail: Option<Value>,
    pub ip_address: Option<String>,
    pub status: StatusCode,
}

impl AuditEvent {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            actor_id: None,
            actor_name: None,
            target_type: None,
            target_id: None,
            detail: None,
            ip_address: None,
            status: StatusCode::OK,
        }
    }

    pub fn actor(mut self, user: &User) -> Self {
        self.actor_id = Some(user.id.into_inner());
        self.actor_name = Some(user.username.clone());
        self
    }

    /// Name only, for attempts where no account could be resolved.
    pub fn actor_name(mut self, name: impl Into<String>) -> Self {
        self.actor_name = Some(name.into());
        self
    }

    pub fn target(mut self, target_type: &'static str) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn target_id(mut self, id: i64) -> Self {
        self.target_id = Some(id);
        self
    }

    pub fn detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Turns the event into its failure form: `*_FAILED` for create, update
    /// and delete, the error's status, and the public error message under
    /// `erro` in the detail.
    pub fn failed(mut self, err: &AppError) -> Self {
        self.action = self.action.failed();
        self.status = err.status;

        let message = Value::String(err.public_message());
        self.detail = Some(match self.detail.take() {
            Some(Value::Object(mut map)) => {
                map.insert("erro".to_string(), message);
                Value::Object(map)
            }
            Some(other) => json!({ "erro": message, "contexto": other }),
            None => json!({ "erro": message }),
        });
        self
    }

    /// Success status on `Ok`, [`AuditEvent::failed`] on `Err`.
    pub fn outcome<T>(self, result: &Result<T, AppError>, success: StatusCode) -> Self {
        match result {
            Ok(_) => self.status(success),
            Err(err) => self.failed(err),
        }
    }
}

/// Appends audit entries without ever failing the caller.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditRepository>,
    clock: SharedClock,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditRepository>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Stores `event`. A store failure is logged and counted, then dropped:
    /// the operation being audited has already happened.
    pub async fn record(&self, event: AuditEvent) {
        let action = event.action;
        let entry = NewAuditLog {
            actor_id: event.actor_id.map(Into::into),
            actor_name: event.actor_name,
            action,
            target_type: event.target_type.map(str::to_string),
            target_id: event.target_id,
            detail: event.detail,
            ip_address: event.ip_address,
            status: i16::try_from(event.status.as_u16()).unwrap_or(i16::MAX),
            occurred_at: self.clock.now(),
        };

        match self.store.append(entry).await {
            Ok(stored) => {
                debug!(audit_id = %stored.id, action = action.as_str(), "audit entry recorded");
            }
            Err(err) => {
                error!(
                    action = action.as_str(),
                    error = ?err.error,
                    "failed to record audit entry"
                );
                track_audit_write_failure(action.as_str());
            }
        }
    }

    /// Newest-first audit entries. Unlike [`AuditRecorder::record`], store
    /// failures propagate.
    pub async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLog>, AppError> {
        self.store.query(query).await
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}
