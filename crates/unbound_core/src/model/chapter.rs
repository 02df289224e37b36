//! Chapter domain model.
//!
//! # Responsibility
//! - Define the unit of stored writing selected through the outline.
//!
//! # Invariants
//! - `id` is assigned by the outline and never changes for a chapter.
//! - `content` is always canonical Markdown, whichever mode last edited it.

use serde::{Deserialize, Serialize};

/// Stable chapter identifier issued by the structure outline.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ChapterId = String;

/// One stored chapter of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    /// Canonical Markdown body.
    pub content: String,
}

impl Chapter {
    /// Creates an empty chapter whose title defaults to its id.
    pub fn new(id: impl Into<ChapterId>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            content: String::new(),
        }
    }

    /// Replaces the title. Returns whether anything changed.
    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if self.title == title {
            return false;
        }
        self.title = title;
        true
    }

    /// Replaces the canonical content. Returns whether anything changed.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.content == content {
            return false;
        }
        self.content = content;
        true
    }
}
