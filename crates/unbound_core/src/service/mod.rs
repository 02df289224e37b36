//! Writing use-cases.
//!
//! # Responsibility
//! - Drive the editor mode state machine.
//! - Orchestrate outline, store and editor into host-facing operations.

pub mod editor_mode;
pub mod session;
