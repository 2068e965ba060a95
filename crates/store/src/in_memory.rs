//! In-Memory Profile Store
//!
//! Thread-safe implementation using RwLock. Clones share the same map, so a
//! handle can be given to the authority while tests keep another.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shared::{ProfileStore, ProfileUpdate, StoreError, Uid, UserProfile};

/// In-memory Profile Store
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<Uid, UserProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store seeded with the given profiles
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let map = profiles.into_iter().map(|p| (p.uid.clone(), p)).collect();
        Self {
            profiles: Arc::new(RwLock::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, uid: &Uid) -> Result<Option<UserProfile>, StoreError> {
        let profiles = self.profiles.read().map_err(|_| StoreError::Persistence {
            message: "Failed to acquire read lock".to_string(),
        })?;
        Ok(profiles.get(uid).cloned())
    }

    fn update(&mut self, uid: &Uid, update: &ProfileUpdate) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().map_err(|_| StoreError::Persistence {
            message: "Failed to acquire write lock".to_string(),
        })?;
        let profile = profiles.get_mut(uid).ok_or_else(|| StoreError::NotFound {
            uid: uid.to_string(),
        })?;
        update.apply_to(profile);
        tracing::debug!(uid = %uid, "profile updated");
        Ok(())
    }

    fn insert(&mut self, profile: UserProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().map_err(|_| StoreError::Persistence {
            message: "Failed to acquire write lock".to_string(),
        })?;
        profiles.insert(profile.uid.clone(), profile);
        Ok(())
    }

    fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let profiles = self.profiles.read().map_err(|_| StoreError::Persistence {
            message: "Failed to acquire read lock".to_string(),
        })?;
        let mut all: Vec<UserProfile> = profiles.values().cloned().collect();
        all.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Role, RoleSet};

    #[test]
    fn test_insert_and_get() {
        let mut store = InMemoryProfileStore::new();
        store.insert(UserProfile::new(Uid::new("alice"))).unwrap();

        let found = store.get(&Uid::new("alice")).unwrap();
        assert!(found.is_some());
        assert!(store.get(&Uid::new("bob")).unwrap().is_none());
        assert!(store.exists(&Uid::new("alice")).unwrap());
    }

    #[test]
    fn test_update_applies_partial_fields() {
        let mut store = InMemoryProfileStore::with_profiles([UserProfile::new(Uid::new("alice"))
            .with_roles(RoleSet::from_roles([Role::Vip, Role::Member]))]);

        store
            .update(&Uid::new("alice"), &ProfileUpdate::banned(true))
            .unwrap();

        let alice = store.get(&Uid::new("alice")).unwrap().unwrap();
        assert!(alice.is_banned);
        assert!(alice.roles.contains_role(Role::Vip));
    }

    #[test]
    fn test_update_missing_profile() {
        let mut store = InMemoryProfileStore::new();
        let err = store
            .update(&Uid::new("ghost"), &ProfileUpdate::banned(true))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryProfileStore::new();
        let mut handle = store.clone();
        handle.insert(UserProfile::new(Uid::new("alice"))).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_sorted_by_uid() {
        let store = InMemoryProfileStore::with_profiles([
            UserProfile::new(Uid::new("carol")),
            UserProfile::new(Uid::new("alice")),
            UserProfile::new(Uid::new("bob")),
        ]);

        let uids: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.uid.to_string())
            .collect();
        assert_eq!(uids, vec!["alice", "bob", "carol"]);
    }
}
