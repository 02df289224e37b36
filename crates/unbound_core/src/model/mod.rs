//! Document content model.
//!
//! # Responsibility
//! - Define chapters (canonical Markdown storage) and the rich document tree
//!   used while editing in rich-text mode.
//! - Define the book outline that assigns chapter ids.
//!
//! # Invariants
//! - A chapter stores exactly one representation: Markdown.

pub mod chapter;
pub mod outline;
pub mod rich;
