//! AuditLogger - Audit trail of moderation decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ModerationAction, ModerationEvent, ModerationOutcome, ModerationSubscriber, Uid};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub actor: Option<Uid>,
    pub target: Uid,
    /// Action description, e.g. "timeout (60m)"
    pub action: String,
    pub success: bool,
    pub reason: Option<String>,
}

/// Types of audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Ban,
    Timeout,
    Unban,
    RoleChange,
    Denied,
}

impl AuditEntry {
    /// Build an entry from a published moderation event
    pub fn from_event(event: &ModerationEvent) -> Self {
        let (event_type, success, reason) = match &event.outcome {
            ModerationOutcome::Applied { .. } => {
                let event_type = match event.action {
                    ModerationAction::Ban => AuditEventType::Ban,
                    ModerationAction::Timeout { .. } => AuditEventType::Timeout,
                    ModerationAction::Unban => AuditEventType::Unban,
                    ModerationAction::RoleChange { .. } => AuditEventType::RoleChange,
                };
                (event_type, true, None)
            }
            ModerationOutcome::Denied { kind } => {
                (AuditEventType::Denied, false, Some(kind.as_str().to_string()))
            }
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: event.at,
            event_type,
            actor: event.actor.clone(),
            target: event.target.clone(),
            action: event.action.to_string(),
            success,
            reason,
        }
    }
}

/// Audit logger
#[derive(Debug)]
pub struct AuditLogger {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogger {
    /// Create a new AuditLogger
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Log an audit entry, evicting the oldest when full
    pub fn log(&mut self, entry: AuditEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Log a moderation event
    pub fn log_event(&mut self, event: &ModerationEvent) {
        self.log(AuditEntry::from_event(event));
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent denials
    pub fn get_recent_denials(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| !e.success)
            .take(limit)
            .collect()
    }

    /// Entries concerning one target, newest first
    pub fn entries_for_target(&self, target: &Uid) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.target == *target)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> AuditStats {
        let total = self.entries.len();
        let denials = self.entries.iter().filter(|e| !e.success).count();

        AuditStats {
            total_entries: total,
            denial_count: denials,
        }
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }
}

/// Audit statistics
#[derive(Debug, Clone)]
pub struct AuditStats {
    pub total_entries: usize,
    pub denial_count: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(10000)
    }
}

/// Audit logger shared between the authority and readers
#[derive(Debug, Clone, Default)]
pub struct SharedAuditLog {
    inner: Arc<Mutex<AuditLogger>>,
}

impl SharedAuditLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AuditLogger::new(max_entries))),
        }
    }

    /// Run `f` against the underlying logger
    pub fn with<R>(&self, f: impl FnOnce(&AuditLogger) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    pub fn get_stats(&self) -> AuditStats {
        self.with(|log| log.get_stats())
    }

    pub fn export_json(&self) -> serde_json::Value {
        self.with(|log| log.export_json())
    }
}

impl ModerationSubscriber for SharedAuditLog {
    fn notify(&self, event: &ModerationEvent) {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.log_event(event);
    }
}
