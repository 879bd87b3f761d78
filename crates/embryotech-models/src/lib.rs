//! # Embryotech Models
//!
//! Domain models and DTOs for the Embryotech API.
//!
//! Database rows, request bodies and query strings live here. Public field
//! names follow the wire format the incubator dashboards already speak
//! (`umidade`, `lote`, `data_inicial`, ...), while Rust-side names stay in
//! English.
//!
//! # Modules
//!
//! - [`audit`]: Audit trail entries, action codes and query filters
//! - [`auth`]: Login request/response bodies
//! - [`ids`]: Strongly-typed row identifiers
//! - [`parameters`]: Target incubation parameters per company and batch
//! - [`readings`]: Sensor readings and report filters
//! - [`users`]: Accounts, registration and role changes

pub mod audit;
pub mod auth;
pub mod ids;
pub mod parameters;
pub mod readings;
pub mod users;

pub use audit::{AuditAction, AuditLog, AuditLogFilter, AuditQuery, NewAuditLog};
pub use auth::{LoginRequest, LoginResponse, MessageResponse};
pub use ids::{AuditLogId, ParameterId, ReadingId, UserId};
pub use parameters::{
    BatchFilter, CreateParameterDto, NewParameter, Parameter, ParameterFilter, UpdateParameterDto,
};
pub use readings::{
    CreateReadingDto, CreateReadingsPayload, NewReading, Reading, ReadingFilter, ReadingQuery,
    ReadingReportParams, UpdateReadingDto,
};
pub use users::{
    ChangePasswordDto, NewUser, RegisterUserDto, SetAdminDto, User, UserKind, UserReportParams,
};
