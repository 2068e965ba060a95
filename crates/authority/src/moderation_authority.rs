//! ModerationAuthority - applies moderation actions through a profile store
//!
//! Each call reads the actor and target fresh from the store, runs the
//! precondition chain, and on success writes exactly one update to the target.
//! Nothing is cached between calls.

use chrono::{DateTime, Duration, Utc};
use rbac::{normalize_roles, ModerationPolicy};
use shared::{
    ModerationAction, ModerationConfig, ModerationEffect, ModerationError, ModerationEvent,
    ModerationOutcome, ModerationStatus, ModerationSubscriber, ProfileStore, ProfileUpdate,
    RoleSet, StoreError, Uid, UserProfile, VerifiedIdentity,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};

/// Moderation authority over a profile store
pub struct ModerationAuthority<S: ProfileStore> {
    store: S,
    policy: ModerationPolicy,
    clock: Arc<dyn Clock>,
    subscribers: Vec<Arc<dyn ModerationSubscriber>>,
}

impl<S: ProfileStore> ModerationAuthority<S> {
    /// Create an authority with the default policy and the wall clock
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: ModerationPolicy::default(),
            clock: Arc::new(SystemClock),
            subscribers: Vec::new(),
        }
    }

    /// Create an authority configured from a `ModerationConfig`
    pub fn from_config(store: S, config: &ModerationConfig) -> Self {
        Self::new(store).with_policy(ModerationPolicy::from_config(config))
    }

    /// Builder: set policy
    pub fn with_policy(mut self, policy: ModerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: set clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a subscriber for moderation events
    pub fn subscribe(&mut self, subscriber: Arc<dyn ModerationSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ban the target
    pub fn apply_ban(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        target: &Uid,
    ) -> Result<ModerationEffect, ModerationError> {
        self.execute(identity, target, ModerationAction::Ban)
    }

    /// Time the target out for `duration_minutes` from now. Any positive value is accepted.
    pub fn apply_timeout(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        target: &Uid,
        duration_minutes: i64,
    ) -> Result<ModerationEffect, ModerationError> {
        self.execute(
            identity,
            target,
            ModerationAction::Timeout {
                minutes: duration_minutes,
            },
        )
    }

    /// Lift both ban and timeout
    pub fn apply_unban(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        target: &Uid,
    ) -> Result<ModerationEffect, ModerationError> {
        self.execute(identity, target, ModerationAction::Unban)
    }

    /// Replace the target's roles; `member` is always kept
    pub fn apply_role_change(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        target: &Uid,
        new_roles: RoleSet,
    ) -> Result<ModerationEffect, ModerationError> {
        self.execute(identity, target, ModerationAction::RoleChange { roles: new_roles })
    }

    /// Fresh copy of a stored profile
    pub fn profile(&self, uid: &Uid) -> Result<UserProfile, ModerationError> {
        self.load(uid)?.ok_or_else(|| ModerationError::NotFound {
            uid: uid.to_string(),
        })
    }

    /// Current posting status of a user
    pub fn status(&self, uid: &Uid) -> Result<ModerationStatus, ModerationError> {
        Ok(self.status_of(&self.profile(uid)?))
    }

    /// Posting status of a profile already in hand, against the authority's clock
    pub fn status_of(&self, profile: &UserProfile) -> ModerationStatus {
        profile.moderation_status(self.clock.now())
    }

    fn execute(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        target: &Uid,
        action: ModerationAction,
    ) -> Result<ModerationEffect, ModerationError> {
        let now = self.clock.now();
        let actor = identity.map(|i| i.uid.clone());
        let result = self.decide_and_apply(identity, target, &action, now);

        let outcome = match &result {
            Ok(effect) => {
                info!(
                    actor = ?actor.as_ref().map(Uid::as_str),
                    target = %target,
                    action = %action,
                    "moderation action applied"
                );
                ModerationOutcome::Applied {
                    effect: effect.clone(),
                }
            }
            Err(err) => {
                warn!(
                    actor = ?actor.as_ref().map(Uid::as_str),
                    target = %target,
                    action = %action,
                    error = %err,
                    "moderation action denied"
                );
                ModerationOutcome::Denied { kind: err.kind() }
            }
        };

        self.publish(&ModerationEvent {
            actor,
            target: target.clone(),
            action,
            outcome,
            at: now,
        });
        result
    }

    fn decide_and_apply(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        target_uid: &Uid,
        action: &ModerationAction,
        now: DateTime<Utc>,
    ) -> Result<ModerationEffect, ModerationError> {
        let identity = identity.ok_or(ModerationError::Unauthorized)?;
        let actor = self
            .load(&identity.uid)?
            .ok_or(ModerationError::Unauthorized)?;
        // Power is checked ahead of argument validation; authorize repeats it
        self.policy.check_power(&actor)?;

        let (update, effect) = plan(action, now)?;

        let target = if actor.uid == *target_uid {
            None
        } else {
            self.load(target_uid)?
        };
        self.policy.authorize(&actor, target_uid, target.as_ref())?;

        self.store.update(target_uid, &update).map_err(store_error)?;
        Ok(effect)
    }

    fn load(&self, uid: &Uid) -> Result<Option<UserProfile>, ModerationError> {
        debug!(uid = %uid, "loading profile");
        self.store.get(uid).map_err(store_error)
    }

    fn publish(&self, event: &ModerationEvent) {
        for subscriber in &self.subscribers {
            subscriber.notify(event);
        }
    }
}

/// Translate an action into the single update it writes and the effect reported back
fn plan(
    action: &ModerationAction,
    now: DateTime<Utc>,
) -> Result<(ProfileUpdate, ModerationEffect), ModerationError> {
    match action {
        ModerationAction::Ban => Ok((ProfileUpdate::banned(true), ModerationEffect::Banned)),
        ModerationAction::Timeout { minutes } => {
            if *minutes <= 0 {
                return Err(ModerationError::InvalidArgument(format!(
                    "timeout duration must be a positive number of minutes, got {}",
                    minutes
                )));
            }
            let until = Duration::try_minutes(*minutes)
                .and_then(|d| now.checked_add_signed(d))
                .ok_or_else(|| {
                    ModerationError::InvalidArgument(format!(
                        "timeout of {} minutes is out of range",
                        minutes
                    ))
                })?;
            Ok((ProfileUpdate::timeout(until), ModerationEffect::TimedOut { until }))
        }
        ModerationAction::Unban => Ok((ProfileUpdate::lift_all(), ModerationEffect::Unbanned)),
        ModerationAction::RoleChange { roles } => {
            let roles = normalize_roles(roles.clone());
            Ok((
                ProfileUpdate::roles(roles.clone()),
                ModerationEffect::RolesChanged { roles },
            ))
        }
    }
}

/// A profile that vanished between read and write is reported like a missing target
fn store_error(err: StoreError) -> ModerationError {
    match err {
        StoreError::NotFound { uid } => ModerationError::NotFound { uid },
        other => ModerationError::Store(other),
    }
}
