//! JSON file profile store
//!
//! The whole user collection lives in one document:
//!
//! ```json
//! { "users": [ { "uid": "alice", "roles": ["Admin"], "isBanned": false } ] }
//! ```
//!
//! The file is the only copy of the data: every call reads it again, and an
//! update rewrites the document with just the one profile changed. Writes go
//! through a sibling temp file and a rename, so a failed write leaves the
//! previous document in place. Two handles on the same file therefore only
//! race on the same profile (last write wins).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shared::{ProfileStore, ProfileUpdate, StoreError, Uid, UserProfile};

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersDocument {
    #[serde(default)]
    users: Vec<UserProfile>,
}

/// Profile store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    path: PathBuf,
}

impl JsonFileProfileStore {
    /// Open a store file. A missing file is an empty store; an unreadable or
    /// corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };
        let count = store.load()?.len();
        tracing::debug!(path = %store.path.display(), count, "opened profile store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<Uid, UserProfile>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let doc: UsersDocument = serde_json::from_str(&content)?;
        Ok(doc.users.into_iter().map(|p| (p.uid.clone(), p)).collect())
    }

    fn persist(&self, profiles: BTreeMap<Uid, UserProfile>) -> Result<(), StoreError> {
        let doc = UsersDocument {
            users: profiles.into_values().collect(),
        };
        let content = serde_json::to_string_pretty(&doc)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ProfileStore for JsonFileProfileStore {
    fn get(&self, uid: &Uid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.load()?.remove(uid))
    }

    fn update(&mut self, uid: &Uid, update: &ProfileUpdate) -> Result<(), StoreError> {
        let mut profiles = self.load()?;
        let profile = profiles.get_mut(uid).ok_or_else(|| StoreError::NotFound {
            uid: uid.to_string(),
        })?;
        update.apply_to(profile);
        self.persist(profiles)?;
        tracing::debug!(uid = %uid, path = %self.path.display(), "profile updated");
        Ok(())
    }

    fn insert(&mut self, profile: UserProfile) -> Result<(), StoreError> {
        let mut profiles = self.load()?;
        profiles.insert(profile.uid.clone(), profile);
        self.persist(profiles)
    }

    fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self.load()?.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::{Role, RoleSet};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileProfileStore {
        JsonFileProfileStore::open(dir.path().join("profiles.json")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.list().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let until = Utc::now() + Duration::minutes(60);

        {
            let mut store = store_in(&dir);
            store
                .insert(
                    UserProfile::new(Uid::new("alice"))
                        .with_roles(RoleSet::from_roles([Role::Admin, Role::Member])),
                )
                .unwrap();
            store.insert(UserProfile::new(Uid::new("bob"))).unwrap();
            store
                .update(&Uid::new("bob"), &ProfileUpdate::timeout(until))
                .unwrap();
        }

        let reopened = store_in(&dir);
        let bob = reopened.get(&Uid::new("bob")).unwrap().unwrap();
        assert_eq!(bob.timeout_until, Some(until));
        let alice = reopened.get(&Uid::new("alice")).unwrap().unwrap();
        assert!(alice.roles.contains_role(Role::Admin));
    }

    #[test]
    fn test_reads_document_written_elsewhere() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(
            &path,
            r#"{"users": [{"uid": "carol", "roles": [], "isBanned": true}]}"#,
        )
        .unwrap();

        let store = JsonFileProfileStore::open(&path).unwrap();
        let carol = store.get(&Uid::new("carol")).unwrap().unwrap();
        assert!(carol.is_banned);
        assert_eq!(carol.roles, RoleSet::member_only());
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileProfileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn test_update_missing_profile_does_not_write() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let err = store
            .update(&Uid::new("ghost"), &ProfileUpdate::banned(true))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_handles_on_same_file_keep_each_others_writes() {
        let dir = TempDir::new().unwrap();
        let mut seed = store_in(&dir);
        seed.insert(UserProfile::new(Uid::new("bob"))).unwrap();
        seed.insert(UserProfile::new(Uid::new("carol"))).unwrap();

        let mut a = store_in(&dir);
        let mut b = store_in(&dir);
        a.update(&Uid::new("bob"), &ProfileUpdate::banned(true)).unwrap();
        b.update(&Uid::new("carol"), &ProfileUpdate::banned(true)).unwrap();

        // b sees a's write without reopening
        assert!(b.get(&Uid::new("bob")).unwrap().unwrap().is_banned);

        let reopened = store_in(&dir);
        assert!(reopened.get(&Uid::new("bob")).unwrap().unwrap().is_banned);
        assert!(reopened.get(&Uid::new("carol")).unwrap().unwrap().is_banned);
    }

    #[test]
    fn test_failed_write_leaves_profile_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert(UserProfile::new(Uid::new("bob"))).unwrap();

        // A directory in the temp file's place makes the write fail
        std::fs::create_dir(store.tmp_path()).unwrap();
        let err = store
            .update(&Uid::new("bob"), &ProfileUpdate::banned(true))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert!(!store.get(&Uid::new("bob")).unwrap().unwrap().is_banned);
        assert!(!store_in(&dir).get(&Uid::new("bob")).unwrap().unwrap().is_banned);
    }
}
