//! # Authority
//!
//! Moderation decisions applied through a profile store.
//!
//! ```text
//! caller (verified identity) ──► ModerationAuthority ──► ProfileStore
//!                                   │  rbac::ModerationPolicy
//!                                   └► ModerationSubscriber (audit, notifications)
//! ```

mod clock;
mod friends;
mod moderation_authority;

pub use clock::{Clock, FixedClock, SystemClock};
pub use friends::{FriendOutcome, FriendService};
pub use moderation_authority::ModerationAuthority;

// Re-export dependencies
pub use rbac::{can_moderate, has_moderation_power, normalize_roles, rank, ModerationPolicy};
