//! Audit trail recording.
//!
//! Handlers describe what happened with an [`AuditEvent`] and hand it to the
//! [`AuditRecorder`], which stamps it with the server clock and appends it.

mod recorder;

pub use recorder::{AuditEvent, AuditRecorder};
