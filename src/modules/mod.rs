pub mod audit_logs;
pub mod auth;
pub mod parameters;
pub mod readings;
pub mod reports;
pub mod system;
pub mod users;
