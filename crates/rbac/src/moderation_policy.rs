//! ModerationPolicy - the precondition chain for moderation actions

use shared::{ModerationConfig, ModerationError, Role, RoleSet, Uid, UserProfile};

use crate::hierarchy::can_moderate;

/// Decides whether an actor may moderate a target.
///
/// The coarse gate (moderation power) runs before the fine rank comparison, so
/// an actor without power is refused with `Unauthorized` regardless of rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationPolicy {
    /// Lowest role that still holds moderation power
    power_floor: Role,
}

impl Default for ModerationPolicy {
    /// Power held by `GOD`, `CEO`, `COO` and `Admin`
    fn default() -> Self {
        Self {
            power_floor: Role::Admin,
        }
    }
}

impl ModerationPolicy {
    pub fn new(power_floor: Role) -> Self {
        Self { power_floor }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(config.power_floor)
    }

    pub fn power_floor(&self) -> Role {
        self.power_floor
    }

    /// True if any recognized role is at or above the power floor
    pub fn has_moderation_power(&self, roles: &RoleSet) -> bool {
        roles.roles().any(|r| r <= self.power_floor)
    }

    /// Coarse gate
    pub fn check_power(&self, actor: &UserProfile) -> Result<(), ModerationError> {
        if self.has_moderation_power(&actor.roles) {
            Ok(())
        } else {
            Err(ModerationError::Unauthorized)
        }
    }

    pub fn check_not_self(&self, actor: &UserProfile, target: &Uid) -> Result<(), ModerationError> {
        if actor.uid == *target {
            Err(ModerationError::SelfActionDenied)
        } else {
            Ok(())
        }
    }

    /// Fine gate: strict rank comparison
    pub fn check_rank(&self, actor: &UserProfile, target: &UserProfile) -> Result<(), ModerationError> {
        if can_moderate(&actor.roles, &target.roles) {
            Ok(())
        } else {
            Err(ModerationError::Forbidden)
        }
    }

    /// Full chain: power, self, existence, rank
    pub fn authorize(
        &self,
        actor: &UserProfile,
        target_uid: &Uid,
        target: Option<&UserProfile>,
    ) -> Result<(), ModerationError> {
        self.check_power(actor)?;
        self.check_not_self(actor, target_uid)?;
        let target = target.ok_or_else(|| ModerationError::NotFound {
            uid: target_uid.to_string(),
        })?;
        self.check_rank(actor, target)
    }

    /// Role-set form of the chain, for callers without stored profiles:
    /// power first, then rank
    pub fn check_roles(&self, actor: &RoleSet, target: &RoleSet) -> Result<(), ModerationError> {
        if !self.has_moderation_power(actor) {
            return Err(ModerationError::Unauthorized);
        }
        if !can_moderate(actor, target) {
            return Err(ModerationError::Forbidden);
        }
        Ok(())
    }

    /// Roles in the hierarchy that hold moderation power
    pub fn power_tier(&self) -> Vec<Role> {
        Role::all()
            .iter()
            .copied()
            .filter(|r| *r <= self.power_floor)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{has_moderation_power, ADMIN_TIER};

    fn profile(uid: &str, roles: &[Role]) -> UserProfile {
        UserProfile::new(Uid::new(uid)).with_roles(RoleSet::from_roles(roles.iter().copied()))
    }

    #[test]
    fn test_default_policy_matches_admin_tier() {
        let policy = ModerationPolicy::default();
        assert_eq!(policy.power_tier(), ADMIN_TIER.to_vec());

        for role in Role::all() {
            let roles = RoleSet::from_roles([*role]);
            assert_eq!(policy.has_moderation_power(&roles), has_moderation_power(&roles));
        }
    }

    #[test]
    fn test_member_refused_before_rank() {
        let policy = ModerationPolicy::default();
        let actor = profile("m", &[Role::Member]);

        // Target missing and actor equal to target: still Unauthorized
        let err = policy.authorize(&actor, &Uid::new("m"), None).unwrap_err();
        assert!(matches!(err, ModerationError::Unauthorized));
    }

    #[test]
    fn test_self_action_denied() {
        let policy = ModerationPolicy::default();
        let actor = profile("god", &[Role::God]);
        let err = policy.authorize(&actor, &Uid::new("god"), Some(&actor)).unwrap_err();
        assert!(matches!(err, ModerationError::SelfActionDenied));
    }

    #[test]
    fn test_missing_target_not_found() {
        let policy = ModerationPolicy::default();
        let actor = profile("a", &[Role::Admin]);
        let err = policy.authorize(&actor, &Uid::new("ghost"), None).unwrap_err();
        assert!(matches!(err, ModerationError::NotFound { uid } if uid == "ghost"));
    }

    #[test]
    fn test_equal_rank_forbidden() {
        let policy = ModerationPolicy::default();
        let actor = profile("a1", &[Role::Admin]);
        let target = profile("a2", &[Role::Admin, Role::Member]);
        let err = policy.authorize(&actor, &target.uid, Some(&target)).unwrap_err();
        assert!(matches!(err, ModerationError::Forbidden));
    }

    #[test]
    fn test_admin_cannot_touch_ceo() {
        let policy = ModerationPolicy::default();
        let actor = profile("admin", &[Role::Admin]);
        let target = profile("ceo", &[Role::Ceo]);
        assert!(matches!(
            policy.authorize(&actor, &target.uid, Some(&target)),
            Err(ModerationError::Forbidden)
        ));
    }

    #[test]
    fn test_check_roles_follows_chain_order() {
        let policy = ModerationPolicy::default();
        let admin = RoleSet::from_roles([Role::Admin]);
        let member = RoleSet::member_only();

        assert!(policy.check_roles(&admin, &member).is_ok());
        assert!(matches!(policy.check_roles(&admin, &admin), Err(ModerationError::Forbidden)));
        // No power beats a losing rank comparison
        assert!(matches!(
            policy.check_roles(&member, &RoleSet::from_roles([Role::God])),
            Err(ModerationError::Unauthorized)
        ));
        assert!(matches!(
            ModerationPolicy::new(Role::Staff)
                .check_roles(&RoleSet::from_roles([Role::Staff]), &RoleSet::from_roles([Role::Coo])),
            Err(ModerationError::Forbidden)
        ));
    }

    #[test]
    fn test_staff_floor_grants_staff_power() {
        let default = ModerationPolicy::default();
        let staff_floor = ModerationPolicy::new(Role::Staff);
        let staff = profile("s", &[Role::Staff]);
        let developer = profile("d", &[Role::Developer]);
        let coo = profile("c", &[Role::Coo]);

        assert!(matches!(
            default.authorize(&staff, &developer.uid, Some(&developer)),
            Err(ModerationError::Unauthorized)
        ));
        assert!(staff_floor.authorize(&staff, &developer.uid, Some(&developer)).is_ok());
        assert!(matches!(
            staff_floor.authorize(&staff, &coo.uid, Some(&coo)),
            Err(ModerationError::Forbidden)
        ));
    }

    #[test]
    fn test_policy_from_config() {
        let config = ModerationConfig {
            power_floor: Role::Coo,
            ..Default::default()
        };
        let policy = ModerationPolicy::from_config(&config);
        assert!(!policy.has_moderation_power(&RoleSet::from_roles([Role::Admin])));
        assert!(policy.has_moderation_power(&RoleSet::from_roles([Role::Coo])));
    }
}
