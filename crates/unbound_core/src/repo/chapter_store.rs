//! In-memory chapter store with an active-chapter slot.
//!
//! # Responsibility
//! - Own every chapter of the open document.
//! - Move content between the active chapter and the editor surface.
//!
//! # Invariants
//! - `get` never fails: unknown ids create an empty chapter titled by its id.
//! - `set_active` flushes the surface into the previous chapter before it
//!   loads the next one.
//! - At most one chapter is active.

use crate::analysis::stats::word_count;
use crate::model::chapter::{Chapter, ChapterId};
use crate::service::editor_mode::EditorSurface;
use log::{debug, info};
use std::collections::HashMap;

/// Exclusive owner of all chapters.
#[derive(Debug, Clone, Default)]
pub struct ChapterStore {
    chapters: HashMap<ChapterId, Chapter>,
    active_id: Option<ChapterId>,
}

impl ChapterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted records. Later records win on
    /// duplicate ids. Nothing is active afterwards.
    pub fn restore(records: impl IntoIterator<Item = Chapter>) -> Self {
        let chapters: HashMap<ChapterId, Chapter> = records
            .into_iter()
            .map(|chapter| (chapter.id.clone(), chapter))
            .collect();
        info!(
            "event=store_restore module=store status=ok chapters={}",
            chapters.len()
        );
        Self {
            chapters,
            active_id: None,
        }
    }

    /// Returns the chapter for `id`, creating it on first access.
    pub fn get(&mut self, id: &str) -> &Chapter {
        self.get_mut(id)
    }

    pub fn get_mut(&mut self, id: &str) -> &mut Chapter {
        self.chapters.entry(id.to_string()).or_insert_with(|| {
            debug!("event=chapter_create module=store id={id}");
            Chapter::new(id)
        })
    }

    /// Looks up a chapter without creating it.
    pub fn find(&self, id: &str) -> Option<&Chapter> {
        self.chapters.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.chapters.contains_key(id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Chapter> {
        self.active_id.as_deref().and_then(|id| self.chapters.get(id))
    }

    /// Makes `id` the active chapter.
    ///
    /// The surface is flushed into the previously active chapter first, then
    /// loaded with the new chapter's content.
    pub fn set_active<S: EditorSurface + ?Sized>(&mut self, id: &str, surface: &mut S) {
        self.save(surface);
        let previous = self.active_id.replace(id.to_string());
        let content = self.get(id).content.clone();
        surface.set_content(&content);
        info!(
            "event=chapter_activate module=store status=ok id={} previous={}",
            id,
            previous.as_deref().unwrap_or("none")
        );
    }

    /// Flushes the surface into the active chapter.
    ///
    /// Returns whether the stored content changed; always `false` when no
    /// chapter is active.
    pub fn save<S: EditorSurface + ?Sized>(&mut self, surface: &S) -> bool {
        let Some(id) = self.active_id.clone() else {
            return false;
        };
        let changed = self.get_mut(&id).set_content(surface.content());
        if changed {
            debug!("event=chapter_save module=store status=ok id={id}");
        }
        changed
    }

    /// Chapters sorted by id.
    pub fn chapters(&self) -> Vec<&Chapter> {
        let mut chapters: Vec<&Chapter> = self.chapters.values().collect();
        chapters.sort_by(|left, right| left.id.cmp(&right.id));
        chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Sum of stored word counts over every chapter.
    pub fn total_word_count(&self) -> usize {
        self.chapters
            .values()
            .map(|chapter| word_count(&chapter.content))
            .sum()
    }
}
