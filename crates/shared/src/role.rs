//! Role hierarchy and role label types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownRoleError;

/// Recognized roles, declared from highest to lowest privilege.
///
/// The derived `Ord` follows declaration order, so `Role::God < Role::Member`
/// and a smaller value always means more privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "GOD")]
    God,
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "COO")]
    Coo,
    Admin,
    Staff,
    Developer,
    #[serde(rename = "VIP")]
    Vip,
    Coder,
    #[serde(rename = "member")]
    Member,
}

impl Role {
    /// The floor of the hierarchy. Every resolved role set contains it.
    pub const LOWEST: Role = Role::Member;

    /// Stored label for this role
    pub fn label(&self) -> &'static str {
        match self {
            Role::God => "GOD",
            Role::Ceo => "CEO",
            Role::Coo => "COO",
            Role::Admin => "Admin",
            Role::Staff => "Staff",
            Role::Developer => "Developer",
            Role::Vip => "VIP",
            Role::Coder => "Coder",
            Role::Member => "member",
        }
    }

    /// Parse a stored label. Matching is exact and case-sensitive.
    pub fn parse(label: &str) -> Option<Role> {
        Role::all().iter().copied().find(|r| r.label() == label)
    }

    /// Numeric rank: 0 for `GOD` through 8 for `member`
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// All roles, highest privilege first
    pub fn all() -> &'static [Role] {
        &[
            Role::God,
            Role::Ceo,
            Role::Coo,
            Role::Admin,
            Role::Staff,
            Role::Developer,
            Role::Vip,
            Role::Coder,
            Role::Member,
        ]
    }

    /// True if `self` is strictly more privileged than `other`
    pub fn outranks(&self, other: Role) -> bool {
        *self < other
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRoleError {
            label: s.to_string(),
            known_roles: Role::all().iter().map(|r| r.label().to_string()).collect(),
        })
    }
}

/// A role label as stored on a profile.
///
/// Profiles may carry labels outside the hierarchy; those are kept as-is but
/// never count towards rank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleLabel(String);

impl RoleLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The recognized role behind this label, if any
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.0)
    }
}

impl From<Role> for RoleLabel {
    fn from(role: Role) -> Self {
        Self(role.label().to_string())
    }
}

impl From<&str> for RoleLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of role labels held by a user. Duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<RoleLabel>);

impl RoleSet {
    /// Empty set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// `{member}`, the resolved form of an empty or missing role list
    pub fn member_only() -> Self {
        Self::from_roles([Role::Member])
    }

    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().map(RoleLabel::from).collect())
    }

    pub fn from_labels<L: Into<RoleLabel>>(labels: impl IntoIterator<Item = L>) -> Self {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn insert(&mut self, label: impl Into<RoleLabel>) -> bool {
        self.0.insert(label.into())
    }

    pub fn contains_role(&self, role: Role) -> bool {
        self.0.iter().any(|l| l.role() == Some(role))
    }

    /// Recognized roles in the set, highest privilege first
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        let recognized: BTreeSet<Role> = self.0.iter().filter_map(RoleLabel::role).collect();
        recognized.into_iter()
    }

    /// Labels in the set that are not part of the hierarchy
    pub fn unknown_labels(&self) -> impl Iterator<Item = &RoleLabel> {
        self.0.iter().filter(|l| l.role().is_none())
    }

    /// Highest-privilege recognized role, if any
    pub fn highest(&self) -> Option<Role> {
        self.0.iter().filter_map(RoleLabel::role).min()
    }

    pub fn labels(&self) -> impl Iterator<Item = &RoleLabel> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<RoleLabel> for RoleSet {
    fn from_iter<T: IntoIterator<Item = RoleLabel>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|l| l.as_str()).collect();
        write!(f, "{{{}}}", labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============== Role Tests ==============

    #[test]
    fn test_role_order_matches_hierarchy() {
        let all = Role::all();
        assert_eq!(all.len(), 9);
        for pair in all.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].outranks(pair[1]));
        }
        assert_eq!(all.last(), Some(&Role::LOWEST));
    }

    #[test]
    fn test_role_rank_values() {
        assert_eq!(Role::God.rank(), 0);
        assert_eq!(Role::Admin.rank(), 3);
        assert_eq!(Role::Staff.rank(), 4);
        assert_eq!(Role::Developer.rank(), 5);
        assert_eq!(Role::Member.rank(), 8);
    }

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!(Role::parse("GOD"), Some(Role::God));
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("member"), Some(Role::Member));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Member"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_from_str_error_lists_known_roles() {
        let err = "Moderator".parse::<Role>().unwrap_err();
        assert_eq!(err.label, "Moderator");
        assert!(err.known_roles.contains(&"VIP".to_string()));
    }

    #[test]
    fn test_role_serde_uses_stored_labels() {
        let json = serde_json::to_string(&Role::Vip).unwrap();
        assert_eq!(json, "\"VIP\"");
        let role: Role = serde_json::from_str("\"member\"").unwrap();
        assert_eq!(role, Role::Member);
    }

    // ============== RoleSet Tests ==============

    #[test]
    fn test_role_set_collapses_duplicates() {
        let set = RoleSet::from_labels(["Admin", "Admin", "member"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_role_set_highest_ignores_unknown() {
        let set = RoleSet::from_labels(["Moderator", "VIP", "Coder"]);
        assert_eq!(set.highest(), Some(Role::Vip));
        assert_eq!(set.unknown_labels().count(), 1);

        let unknown = RoleSet::from_labels(["Moderator"]);
        assert_eq!(unknown.highest(), None);
    }

    #[test]
    fn test_role_set_roles_sorted_by_privilege() {
        let set = RoleSet::from_labels(["member", "Staff", "CEO"]);
        let roles: Vec<Role> = set.roles().collect();
        assert_eq!(roles, vec![Role::Ceo, Role::Staff, Role::Member]);
    }

    #[test]
    fn test_role_set_display() {
        let set = RoleSet::from_roles([Role::Vip, Role::Member]);
        assert_eq!(set.to_string(), "{VIP, member}");
    }
}
