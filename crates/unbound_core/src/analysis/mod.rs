//! Derived text analysis.
//!
//! # Responsibility
//! - Compute statistics shown next to the editor on every content change.
//!
//! # Invariants
//! - Analysis is pure and never fails.

pub mod stats;
