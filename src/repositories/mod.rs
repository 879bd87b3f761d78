//! Storage seams.
//!
//! Handlers and services only see these traits. [`postgres`] holds the
//! production implementations; the in-memory ones back the test suite.
//!
//! Every method returns [`AppError`]. Store failures surface as
//! `dependency_failure`, duplicate keys as `conflict`.

use async_trait::async_trait;
use embryotech_core::AppError;
use embryotech_models::{
    AuditLog, AuditQuery, NewAuditLog, NewParameter, NewReading, NewUser, Parameter, ParameterId,
    Reading, ReadingId, ReadingQuery, User, UserId,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

/// Credential store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Fails with `conflict` when the username or email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<Option<User>, AppError>;

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Inserts every reading or none of them.
    async fn create_many(&self, readings: Vec<NewReading>) -> Result<Vec<Reading>, AppError>;

    /// Matching readings, newest `started_at` first.
    async fn list(&self, query: &ReadingQuery) -> Result<Vec<Reading>, AppError>;

    async fn find(&self, id: ReadingId) -> Result<Option<Reading>, AppError>;

    async fn update(&self, reading: &Reading) -> Result<Option<Reading>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: ReadingId) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ParameterRepository: Send + Sync {
    async fn create(&self, parameter: NewParameter) -> Result<Parameter, AppError>;

    async fn find_by_company_batch(
        &self,
        company: &str,
        batch: &str,
    ) -> Result<Vec<Parameter>, AppError>;

    async fn find(&self, id: ParameterId) -> Result<Option<Parameter>, AppError>;

    async fn update(&self, parameter: &Parameter) -> Result<Option<Parameter>, AppError>;

    async fn delete(&self, id: ParameterId) -> Result<bool, AppError>;

    /// Distinct company names, sorted.
    async fn companies(&self) -> Result<Vec<String>, AppError>;

    /// Distinct batch codes, sorted, optionally for one company.
    async fn batches(&self, company: Option<&str>) -> Result<Vec<String>, AppError>;
}

/// Append-only audit store.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog, AppError>;

    /// Matching entries, newest first, at most `query.limit`.
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLog>, AppError>;
}
