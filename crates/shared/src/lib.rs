//! # Shared
//!
//! Common types and interfaces used across the moderation crates.

pub mod error;
pub mod role;
pub mod profile;
pub mod store;
pub mod event;
pub mod config;

// Re-exports
pub use error::*;
pub use role::*;
pub use profile::*;
pub use store::*;
pub use event::*;
pub use config::*;
