//! # Embryotech API
//!
//! Backend for monitoring egg incubation rooms. Sensors (or operators)
//! post readings of temperature, humidity, pressure and light per batch,
//! and administrators maintain the ideal parameters each batch is compared
//! against.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── audit/          # Audit recorder used by every mutating handler
//! ├── middleware/     # Access control guard, client IP, admin layer
//! ├── modules/        # Feature modules
//! │   ├── auth/         # Register, login, logout, me
//! │   ├── users/        # User administration
//! │   ├── readings/     # Sensor readings
//! │   ├── parameters/   # Ideal parameters per company and batch
//! │   ├── audit_logs/   # Audit log queries
//! │   ├── reports/      # JSON and PDF reports
//! │   └── system/       # Health endpoint
//! ├── repositories/   # Storage traits with PostgreSQL and in-memory backends
//! ├── router.rs       # Route tree and layers
//! └── state.rs        # Shared application state
//! ```
//!
//! Feature modules follow `controller.rs` / `service.rs` / `router.rs`.
//!
//! ## Access control
//!
//! Every route under `/api` except `/register`, `/login` and the status
//! endpoint requires `Authorization: Bearer <token>`. Administrative routes
//! additionally require the stored user to hold the admin role. A refusal
//! on an admin route is written to the audit log as `ACCESS_DENIED`.
//!
//! ## Audit
//!
//! Every state-changing request writes exactly one audit entry, whether it
//! succeeded or not. A failing audit store never fails the request.

pub mod audit;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod repositories;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use embryotech_auth;
pub use embryotech_config;
pub use embryotech_core;
pub use embryotech_db;
pub use embryotech_models;
