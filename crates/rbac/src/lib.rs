//! # RBAC
//!
//! Role ranking and moderation permission checks.
//!
//! ## Components
//!
//! - `hierarchy` - rank, moderation power, can-moderate, role normalization
//! - `ModerationPolicy` - precondition chain applied before every moderation action

pub mod hierarchy;
pub mod moderation_policy;

pub use hierarchy::{can_moderate, effective_role, has_moderation_power, normalize_roles, rank, ADMIN_TIER};
pub use moderation_policy::ModerationPolicy;
