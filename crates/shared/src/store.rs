//! ProfileStore - the port the authority persists through
//!
//! ```text
//! authority               │  store adapters
//! ────────────────────────┼────────────────────────
//! trait ProfileStore      │  InMemoryProfileStore
//!   fn get()              │  JsonFileProfileStore
//!   fn update()           │  (document database)
//! ```

use crate::error::StoreError;
use crate::profile::{ProfileUpdate, Uid, UserProfile};

/// Profile store trait.
///
/// No async here; an async document store is wrapped by the calling layer,
/// which awaits reads before invoking the authority.
pub trait ProfileStore {
    /// Fetch the current persisted profile
    fn get(&self, uid: &Uid) -> Result<Option<UserProfile>, StoreError>;

    /// Write the set fields of `update` onto an existing profile
    fn update(&mut self, uid: &Uid, update: &ProfileUpdate) -> Result<(), StoreError>;

    /// Create or replace a profile
    fn insert(&mut self, profile: UserProfile) -> Result<(), StoreError>;

    /// All profiles, ordered by uid
    fn list(&self) -> Result<Vec<UserProfile>, StoreError>;

    /// Check if a profile exists
    fn exists(&self, uid: &Uid) -> Result<bool, StoreError> {
        Ok(self.get(uid)?.is_some())
    }
}
