//! # Store
//!
//! Implementations of the `ProfileStore` port.
//!
//! - `in_memory` - thread-safe map, for tests and embedding
//! - `json_file` - a single JSON document of profiles, used by the CLI

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryProfileStore;
pub use json_file::JsonFileProfileStore;
