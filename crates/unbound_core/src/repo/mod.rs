//! Chapter storage.
//!
//! # Responsibility
//! - Own chapter state and the active-chapter slot.
//! - Keep editor flush/load ordering inside one boundary.

pub mod chapter_store;
