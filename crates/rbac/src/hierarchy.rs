//! Rank and privilege comparisons over role sets
//!
//! All functions here are pure and total. Unknown labels are ignored.

use shared::{Role, RoleSet};

/// Rank of a role set: 0 for `GOD` through 8 for `member`.
///
/// The highest-privilege recognized role decides. A set with no recognized
/// role (including the empty set) ranks as `member`.
pub fn rank(roles: &RoleSet) -> u8 {
    effective_role(roles).rank()
}

/// Highest-privilege recognized role, falling back to `member`
pub fn effective_role(roles: &RoleSet) -> Role {
    roles.highest().unwrap_or(Role::LOWEST)
}

/// Roles that hold moderation power under the default policy
pub const ADMIN_TIER: [Role; 4] = [Role::God, Role::Ceo, Role::Coo, Role::Admin];

/// True iff the set contains an admin-tier role (`GOD`, `CEO`, `COO`, `Admin`)
pub fn has_moderation_power(roles: &RoleSet) -> bool {
    ADMIN_TIER.iter().any(|r| roles.contains_role(*r))
}

/// True iff the actor strictly outranks the target. Ties never permit.
pub fn can_moderate(actor_roles: &RoleSet, target_roles: &RoleSet) -> bool {
    rank(actor_roles) < rank(target_roles)
}

/// Resolve a requested role set so that `member` is always present.
///
/// An empty request becomes `{member}`; otherwise `member` is added.
pub fn normalize_roles(new_roles: RoleSet) -> RoleSet {
    let mut roles = new_roles;
    if !roles.contains_role(Role::Member) {
        roles.insert(Role::Member);
    }
    roles
}
