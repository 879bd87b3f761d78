//! Administrator reports: a JSON readings report and PDF exports of
//! readings, the audit trail and user accounts.

pub mod controller;
pub mod pdf;
pub mod router;
pub mod service;
