//! Administrator view of the audit trail.

pub mod controller;
pub mod router;
