//! modctl library: command implementations and shared context

pub mod commands;
pub mod context;
