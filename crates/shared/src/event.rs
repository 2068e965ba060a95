//! Moderation events published after every decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DenialKind;
use crate::profile::Uid;
use crate::role::RoleSet;

/// Requested moderation action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModerationAction {
    Ban,
    Timeout { minutes: i64 },
    Unban,
    RoleChange { roles: RoleSet },
}

impl ModerationAction {
    pub fn name(&self) -> &'static str {
        match self {
            ModerationAction::Ban => "ban",
            ModerationAction::Timeout { .. } => "timeout",
            ModerationAction::Unban => "unban",
            ModerationAction::RoleChange { .. } => "role_change",
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModerationAction::Timeout { minutes } => write!(f, "timeout ({minutes}m)"),
            ModerationAction::RoleChange { roles } => write!(f, "role change to {roles}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Mutation applied to the target by a successful action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModerationEffect {
    Banned,
    TimedOut { until: DateTime<Utc> },
    Unbanned,
    RolesChanged { roles: RoleSet },
}

/// Result of one moderation decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModerationOutcome {
    Applied { effect: ModerationEffect },
    Denied { kind: DenialKind },
}

impl ModerationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ModerationOutcome::Applied { .. })
    }
}

/// One decision, as seen by subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationEvent {
    /// `None` when the request carried no identity
    pub actor: Option<Uid>,
    pub target: Uid,
    pub action: ModerationAction,
    pub outcome: ModerationOutcome,
    pub at: DateTime<Utc>,
}

/// Receives moderation events (publish-on-mutation)
pub trait ModerationSubscriber: Send + Sync {
    fn notify(&self, event: &ModerationEvent);
}
