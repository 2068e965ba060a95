//! Error types for the moderation workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error thrown when a role label is not part of the hierarchy
#[derive(Debug, Error)]
#[error("Role '{label}' is not recognized. Known roles: {}", known_roles.join(", "))]
pub struct UnknownRoleError {
    pub label: String,
    pub known_roles: Vec<String>,
}

/// Error thrown when a uid does not have the expected shape
#[derive(Debug, Error)]
#[error("Invalid uid '{0}': expected 1-128 characters of [A-Za-z0-9_-]")]
pub struct InvalidUidError(pub String);

/// Errors raised by a profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Profile not found: {uid}")]
    NotFound { uid: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Refusal or failure of a moderation action.
///
/// Every variant except `Store` is an authorization decision and is terminal.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Unauthorized: a verified identity with moderation power is required")]
    Unauthorized,

    #[error("Forbidden: actor does not outrank the target")]
    Forbidden,

    #[error("User '{uid}' not found")]
    NotFound { uid: String },

    #[error("Moderators cannot act on themselves")]
    SelfActionDenied,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ModerationError {
    /// Fieldless kind, for audit records and events
    pub fn kind(&self) -> DenialKind {
        match self {
            ModerationError::Unauthorized => DenialKind::Unauthorized,
            ModerationError::Forbidden => DenialKind::Forbidden,
            ModerationError::NotFound { .. } => DenialKind::NotFound,
            ModerationError::SelfActionDenied => DenialKind::SelfActionDenied,
            ModerationError::InvalidArgument(_) => DenialKind::InvalidArgument,
            ModerationError::Store(_) => DenialKind::StoreFailure,
        }
    }

    /// True for authorization decisions, false for store failures
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ModerationError::Store(_))
    }
}

impl From<InvalidUidError> for ModerationError {
    fn from(err: InvalidUidError) -> Self {
        ModerationError::InvalidArgument(err.to_string())
    }
}

/// Kind of a refused or failed moderation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthorized,
    Forbidden,
    NotFound,
    SelfActionDenied,
    InvalidArgument,
    StoreFailure,
}

impl DenialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialKind::Unauthorized => "unauthorized",
            DenialKind::Forbidden => "forbidden",
            DenialKind::NotFound => "not_found",
            DenialKind::SelfActionDenied => "self_action_denied",
            DenialKind::InvalidArgument => "invalid_argument",
            DenialKind::StoreFailure => "store_failure",
        }
    }
}

/// Refusal or failure of a friend request operation
#[derive(Debug, Error)]
pub enum FriendError {
    #[error("Unauthorized: a verified identity is required")]
    Unauthorized,

    #[error("User '{uid}' not found")]
    NotFound { uid: String },

    #[error("Users cannot befriend themselves")]
    SelfRequest,

    #[error("Already friends with '{uid}'")]
    AlreadyFriends { uid: String },

    #[error("No pending friend request from '{uid}'")]
    NoPendingRequest { uid: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ModerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ModerationError::Unauthorized.kind(), DenialKind::Unauthorized);
        assert_eq!(
            ModerationError::NotFound { uid: "x".into() }.kind(),
            DenialKind::NotFound
        );
        let store = ModerationError::from(StoreError::Persistence {
            message: "lock poisoned".into(),
        });
        assert_eq!(store.kind(), DenialKind::StoreFailure);
        assert!(!store.is_terminal());
        assert!(ModerationError::Forbidden.is_terminal());
    }

    #[test]
    fn test_invalid_uid_becomes_invalid_argument() {
        let err: ModerationError = InvalidUidError("bad uid".into()).into();
        assert!(matches!(err, ModerationError::InvalidArgument(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ModerationError::NotFound { uid: "bob".into() };
        assert_eq!(err.to_string(), "User 'bob' not found");
    }
}
