//! # Audit
//!
//! Audit logging of moderation decisions.

mod audit_logger;

pub use audit_logger::{AuditEntry, AuditEventType, AuditLogger, AuditStats, SharedAuditLog};
