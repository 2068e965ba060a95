//! FriendService - friend requests and friendships between two profiles
//!
//! Request state is mirrored on both profiles: the sender holds `Sent`, the
//! recipient holds `Received`. Accepting or removing clears both sides.

use shared::{
    FriendError, FriendRequestState, ProfileStore, ProfileUpdate, Uid, UserProfile,
    VerifiedIdentity,
};
use tracing::info;

/// Result of sending a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendOutcome {
    /// Request recorded, waiting on the other user
    RequestSent,
    /// The other user had already asked; both are now friends
    Accepted,
}

/// Friend relationship operations over a profile store
pub struct FriendService<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> FriendService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Send a friend request to `to`
    pub fn send_request(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        to: &Uid,
    ) -> Result<FriendOutcome, FriendError> {
        let actor = self.actor(identity)?;
        if actor.uid == *to {
            return Err(FriendError::SelfRequest);
        }
        let other = self.require(to)?;
        if actor.is_friend(to) {
            return Err(FriendError::AlreadyFriends { uid: to.to_string() });
        }

        if actor.friend_requests.get(to) == Some(&FriendRequestState::Received) {
            self.befriend(actor, other)?;
            return Ok(FriendOutcome::Accepted);
        }

        let mut actor_requests = actor.friend_requests.clone();
        actor_requests.insert(to.clone(), FriendRequestState::Sent);
        let mut other_requests = other.friend_requests.clone();
        other_requests.insert(actor.uid.clone(), FriendRequestState::Received);

        self.store.update(
            &actor.uid,
            &ProfileUpdate {
                friend_requests: Some(actor_requests),
                ..Default::default()
            },
        )?;
        self.store.update(
            to,
            &ProfileUpdate {
                friend_requests: Some(other_requests),
                ..Default::default()
            },
        )?;

        info!(from = %actor.uid, to = %to, "friend request sent");
        Ok(FriendOutcome::RequestSent)
    }

    /// Accept a request previously received from `requester`
    pub fn accept_request(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        requester: &Uid,
    ) -> Result<(), FriendError> {
        let actor = self.actor(identity)?;
        if actor.friend_requests.get(requester) != Some(&FriendRequestState::Received) {
            return Err(FriendError::NoPendingRequest {
                uid: requester.to_string(),
            });
        }
        let other = self.require(requester)?;
        self.befriend(actor, other)
    }

    /// Remove a friendship and any pending requests between the two users.
    ///
    /// Declining a request is the same operation. Removing someone who is
    /// not a friend is a no-op; a deleted other profile is only cleaned on
    /// the actor's side.
    pub fn remove_friend(
        &mut self,
        identity: Option<&VerifiedIdentity>,
        other: &Uid,
    ) -> Result<(), FriendError> {
        let actor = self.actor(identity)?;
        if actor.uid == *other {
            return Err(FriendError::SelfRequest);
        }

        self.detach(&actor, other)?;
        if let Some(other_profile) = self.store.get(other)? {
            self.detach(&other_profile, &actor.uid)?;
        }

        info!(user = %actor.uid, other = %other, "friendship removed");
        Ok(())
    }

    /// Uids with a request waiting on `uid`
    pub fn pending_received(&self, uid: &Uid) -> Result<Vec<Uid>, FriendError> {
        let profile = self.require(uid)?;
        Ok(profile.pending_received().into_iter().cloned().collect())
    }

    fn actor(&self, identity: Option<&VerifiedIdentity>) -> Result<UserProfile, FriendError> {
        let identity = identity.ok_or(FriendError::Unauthorized)?;
        self.store
            .get(&identity.uid)?
            .ok_or(FriendError::Unauthorized)
    }

    fn require(&self, uid: &Uid) -> Result<UserProfile, FriendError> {
        self.store.get(uid)?.ok_or_else(|| FriendError::NotFound {
            uid: uid.to_string(),
        })
    }

    fn befriend(&mut self, a: UserProfile, b: UserProfile) -> Result<(), FriendError> {
        for (me, them) in [(&a, &b.uid), (&b, &a.uid)] {
            let mut friends = me.friends.clone();
            friends.insert(them.clone());
            let mut requests = me.friend_requests.clone();
            requests.remove(them);
            self.store.update(
                &me.uid,
                &ProfileUpdate {
                    friends: Some(friends),
                    friend_requests: Some(requests),
                    ..Default::default()
                },
            )?;
        }
        info!(a = %a.uid, b = %b.uid, "friend request accepted");
        Ok(())
    }

    fn detach(&mut self, me: &UserProfile, them: &Uid) -> Result<(), FriendError> {
        if !me.friends.contains(them) && !me.friend_requests.contains_key(them) {
            return Ok(());
        }
        let mut friends = me.friends.clone();
        friends.remove(them);
        let mut requests = me.friend_requests.clone();
        requests.remove(them);
        self.store.update(
            &me.uid,
            &ProfileUpdate {
                friends: Some(friends),
                friend_requests: Some(requests),
                ..Default::default()
            },
        )?;
        Ok(())
    }
}
