//! User profiles as persisted by the profile store

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use crate::error::InvalidUidError;
use crate::role::RoleSet;

/// Unique identifier of a user
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse untrusted input, checking the shape of the identifier
    pub fn parse(id: &str) -> Result<Self, InvalidUidError> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("uid pattern is valid")
        });
        if pattern.is_match(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(InvalidUidError(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity the caller has already verified (session or token layer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: Uid,
}

impl VerifiedIdentity {
    pub fn new(uid: Uid) -> Self {
        Self { uid }
    }
}

/// Direction of a pending friend request, from the profile owner's view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestState {
    Sent,
    Received,
}

/// Posting status derived from ban and timeout state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStatus {
    Active,
    TimedOut { until: DateTime<Utc> },
    Banned,
}

/// Persisted user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: Uid,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub bio: String,

    /// Never empty once loaded; a missing or empty list reads as `{member}`
    #[serde(default = "RoleSet::member_only", deserialize_with = "deserialize_roles")]
    pub roles: RoleSet,

    #[serde(default)]
    pub is_banned: bool,

    #[serde(default)]
    pub timeout_until: Option<DateTime<Utc>>,

    #[serde(default)]
    pub friends: BTreeSet<Uid>,

    #[serde(default)]
    pub friend_requests: BTreeMap<Uid, FriendRequestState>,
}

fn deserialize_roles<'de, D>(deserializer: D) -> Result<RoleSet, D::Error>
where
    D: Deserializer<'de>,
{
    let roles = Option::<RoleSet>::deserialize(deserializer)?.unwrap_or_default();
    if roles.is_empty() {
        Ok(RoleSet::member_only())
    } else {
        Ok(roles)
    }
}

impl UserProfile {
    /// New profile in the state a first login creates
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            display_name: None,
            email: None,
            photo_url: None,
            bio: String::new(),
            roles: RoleSet::member_only(),
            is_banned: false,
            timeout_until: None,
            friends: BTreeSet::new(),
            friend_requests: BTreeMap::new(),
        }
    }

    /// Builder: set roles
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.roles = roles;
        self
    }

    /// Builder: set display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// True if a timeout is set and still in the future at `now`
    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        self.timeout_until.is_some_and(|until| until > now)
    }

    /// Ban wins over an active timeout; an expired timeout is ignored
    pub fn moderation_status(&self, now: DateTime<Utc>) -> ModerationStatus {
        if self.is_banned {
            return ModerationStatus::Banned;
        }
        match self.timeout_until {
            Some(until) if until > now => ModerationStatus::TimedOut { until },
            _ => ModerationStatus::Active,
        }
    }

    pub fn can_post(&self, now: DateTime<Utc>) -> bool {
        self.moderation_status(now) == ModerationStatus::Active
    }

    pub fn is_friend(&self, other: &Uid) -> bool {
        self.friends.contains(other)
    }

    /// Uids whose requests are waiting on this user
    pub fn pending_received(&self) -> Vec<&Uid> {
        self.friend_requests
            .iter()
            .filter(|(_, state)| **state == FriendRequestState::Received)
            .map(|(uid, _)| uid)
            .collect()
    }
}

/// Partial update of a profile, mirroring a field-level document write.
///
/// `None` leaves a field untouched. `timeout_until: Some(None)` clears the
/// timeout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub is_banned: Option<bool>,
    pub timeout_until: Option<Option<DateTime<Utc>>>,
    pub roles: Option<RoleSet>,
    pub friends: Option<BTreeSet<Uid>>,
    pub friend_requests: Option<BTreeMap<Uid, FriendRequestState>>,
}

impl ProfileUpdate {
    pub fn banned(is_banned: bool) -> Self {
        Self {
            is_banned: Some(is_banned),
            ..Default::default()
        }
    }

    pub fn timeout(until: DateTime<Utc>) -> Self {
        Self {
            timeout_until: Some(Some(until)),
            ..Default::default()
        }
    }

    /// Lift both ban and timeout
    pub fn lift_all() -> Self {
        Self {
            is_banned: Some(false),
            timeout_until: Some(None),
            ..Default::default()
        }
    }

    pub fn roles(roles: RoleSet) -> Self {
        Self {
            roles: Some(roles),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields onto `profile`
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(is_banned) = self.is_banned {
            profile.is_banned = is_banned;
        }
        if let Some(timeout_until) = self.timeout_until {
            profile.timeout_until = timeout_until;
        }
        if let Some(roles) = &self.roles {
            profile.roles = roles.clone();
        }
        if let Some(friends) = &self.friends {
            profile.friends = friends.clone();
        }
        if let Some(requests) = &self.friend_requests {
            profile.friend_requests = requests.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use chrono::Duration;

    // ============== Uid Tests ==============

    #[test]
    fn test_uid_parse_accepts_firebase_style_ids() {
        assert!(Uid::parse("k3XbQ9vT2mR1aZ0pLw8yN5cE7u42").is_ok());
        assert!(Uid::parse("user_1-a").is_ok());
    }

    #[test]
    fn test_uid_parse_rejects_bad_input() {
        assert!(Uid::parse("").is_err());
        assert!(Uid::parse("has space").is_err());
        assert!(Uid::parse("users/alice").is_err());
        assert!(Uid::parse(&"a".repeat(129)).is_err());
    }

    // ============== Deserialization Tests ==============

    #[test]
    fn test_profile_document_layout() {
        let json = r#"{
            "uid": "alice",
            "displayName": "Alice",
            "photoURL": "https://example.com/a.png",
            "roles": ["Admin", "member"],
            "isBanned": false,
            "timeoutUntil": null,
            "friends": ["bob"],
            "friendRequests": {"carol": "received"}
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.uid, Uid::new("alice"));
        assert_eq!(profile.photo_url.as_deref(), Some("https://example.com/a.png"));
        assert!(profile.roles.contains_role(Role::Admin));
        assert!(profile.is_friend(&Uid::new("bob")));
        assert_eq!(profile.pending_received(), vec![&Uid::new("carol")]);
    }

    #[test]
    fn test_missing_roles_default_to_member() {
        let profile: UserProfile = serde_json::from_str(r#"{"uid": "u1"}"#).unwrap();
        assert_eq!(profile.roles, RoleSet::member_only());
        assert!(!profile.is_banned);
        assert!(profile.timeout_until.is_none());
    }

    #[test]
    fn test_empty_or_null_roles_default_to_member() {
        let empty: UserProfile = serde_json::from_str(r#"{"uid": "u1", "roles": []}"#).unwrap();
        assert_eq!(empty.roles, RoleSet::member_only());

        let null: UserProfile = serde_json::from_str(r#"{"uid": "u1", "roles": null}"#).unwrap();
        assert_eq!(null.roles, RoleSet::member_only());
    }

    // ============== Status Tests ==============

    #[test]
    fn test_moderation_status() {
        let now = Utc::now();
        let mut profile = UserProfile::new(Uid::new("u1"));
        assert_eq!(profile.moderation_status(now), ModerationStatus::Active);
        assert!(profile.can_post(now));

        let until = now + Duration::minutes(5);
        profile.timeout_until = Some(until);
        assert_eq!(profile.moderation_status(now), ModerationStatus::TimedOut { until });
        assert!(!profile.can_post(now));

        profile.is_banned = true;
        assert_eq!(profile.moderation_status(now), ModerationStatus::Banned);
    }

    #[test]
    fn test_expired_timeout_reads_as_active() {
        let now = Utc::now();
        let mut profile = UserProfile::new(Uid::new("u1"));
        profile.timeout_until = Some(now - Duration::minutes(1));
        assert!(!profile.is_timed_out(now));
        assert!(profile.can_post(now));
    }

    // ============== ProfileUpdate Tests ==============

    #[test]
    fn test_update_only_touches_set_fields() {
        let mut profile = UserProfile::new(Uid::new("u1"))
            .with_roles(RoleSet::from_roles([Role::Vip, Role::Member]));
        let before = profile.clone();

        ProfileUpdate::banned(true).apply_to(&mut profile);
        assert!(profile.is_banned);
        assert_eq!(profile.roles, before.roles);
        assert_eq!(profile.timeout_until, before.timeout_until);
    }

    #[test]
    fn test_lift_all_clears_ban_and_timeout() {
        let mut profile = UserProfile::new(Uid::new("u1"));
        profile.is_banned = true;
        profile.timeout_until = Some(Utc::now());

        ProfileUpdate::lift_all().apply_to(&mut profile);
        assert!(!profile.is_banned);
        assert!(profile.timeout_until.is_none());
    }

    #[test]
    fn test_empty_update() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate::banned(false).is_empty());
    }
}
