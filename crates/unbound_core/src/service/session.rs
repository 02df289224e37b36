//! Writing session use-cases.
//!
//! # Responsibility
//! - Wire outline selection, chapter store, editor mode controller and
//!   statistics into the operations a host UI calls.
//! - Produce whole-document snapshots for persistence.
//!
//! # Invariants
//! - Chapter switches always flush before they load (see `ChapterStore`).
//! - Statistics always describe the live editor buffer.
//! - Chapter content is never logged.

use crate::analysis::stats::{stats, word_count, TextStats};
use crate::config::{SessionConfig, DEFAULT_PROJECT_TITLE};
use crate::model::chapter::{Chapter, ChapterId};
use crate::model::outline::{Outline, OutlineError, SectionKind};
use crate::repo::chapter_store::ChapterStore;
use crate::service::editor_mode::{
    EditorError, EditorMode, EditorModeController, EditorSurface, LiveEdit, ModeChange,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// What the editor surface shows after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterView {
    pub id: ChapterId,
    pub title: String,
    /// Canonical Markdown content.
    pub content: String,
}

/// User-visible warning for an export that was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportWarning {
    EmptyContent,
}

impl Display for ExportWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "No content to export."),
        }
    }
}

/// Whole-document persistence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub project_title: String,
    /// Outline order first, then chapters the outline does not know (by id).
    pub chapters: Vec<Chapter>,
}

/// One open writing project.
#[derive(Debug)]
pub struct WritingSession {
    config: SessionConfig,
    project_title: String,
    outline: Outline,
    store: ChapterStore,
    editor: EditorModeController,
    stats: TextStats,
}

impl Default for WritingSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl WritingSession {
    /// Creates a session with the default book outline and no chapters.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_outline(config, Outline::default_book())
    }

    pub fn with_outline(config: SessionConfig, outline: Outline) -> Self {
        let editor = EditorModeController::new(config.initial_mode);
        let project_title = config.effective_project_title().to_string();
        info!(
            "event=session_open module=session status=ok mode={} autosave={}",
            editor.mode(),
            config.autosave_on_change
        );
        Self {
            config,
            project_title,
            outline,
            store: ChapterStore::new(),
            editor,
            stats: TextStats::default(),
        }
    }

    /// Reopens a snapshot. Outline items of restored chapters take the
    /// chapter titles.
    pub fn from_snapshot(config: SessionConfig, snapshot: DocumentSnapshot) -> Self {
        let mut session = Self::new(config);
        session.set_project_title(&snapshot.project_title);
        for chapter in &snapshot.chapters {
            // Ids outside the outline and blank stored titles leave it as is.
            if let Err(err) = session.outline.rename_item(&chapter.id, chapter.title.as_str()) {
                debug!(
                    "event=snapshot_title_skipped module=session chapter={} reason={}",
                    chapter.id, err
                );
            }
        }
        session.store = ChapterStore::restore(snapshot.chapters);
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn store(&self) -> &ChapterStore {
        &self.store
    }

    pub fn editor(&self) -> &EditorModeController {
        &self.editor
    }

    /// Registers the host callback for mode switches.
    pub fn set_mode_change_callback(&mut self, callback: impl FnMut(ModeChange) + 'static) {
        self.editor.set_mode_change_callback(callback);
    }

    pub fn mode(&self) -> EditorMode {
        self.editor.mode()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.store.active_id()
    }

    /// Handles an outline selection.
    ///
    /// Flushes the editor into the current chapter, activates `id` (creating
    /// it when unknown) and loads it. The chapter title follows the outline
    /// item when the outline knows the id.
    pub fn item_selected(&mut self, id: &str) -> ChapterView {
        self.store.set_active(id, &mut self.editor);
        if let Some(item) = self.outline.select(id) {
            self.store.get_mut(id).set_title(item.title.as_str());
        }
        self.refresh_stats();

        let chapter = self.store.get(id);
        ChapterView {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            content: chapter.content.clone(),
        }
    }

    /// Handles a content change reported by the surface.
    ///
    /// # Errors
    /// - `EditorError::ModeMismatch` when the edit does not belong to the
    ///   current mode; nothing is saved.
    pub fn content_changed(&mut self, edit: LiveEdit) -> Result<TextStats, EditorError> {
        self.editor.apply_edit(edit)?;
        if self.config.autosave_on_change {
            self.store.save(&self.editor);
        }
        Ok(self.refresh_stats())
    }

    /// Switches the editing mode. Returns whether the mode changed.
    pub fn set_mode(&mut self, mode: EditorMode) -> bool {
        let changed = self.editor.set_mode(mode);
        if changed {
            self.refresh_stats();
        }
        changed
    }

    pub fn toggle_mode(&mut self) -> ModeChange {
        let change = self.editor.toggle_mode();
        self.refresh_stats();
        change
    }

    /// Flushes the editor into the active chapter.
    pub fn save(&mut self) -> bool {
        self.store.save(&self.editor)
    }

    /// Statistics of the live buffer.
    pub fn statistics(&self) -> TextStats {
        self.stats
    }

    /// Words over every chapter, counting the live buffer for the active one.
    pub fn total_word_count(&self) -> usize {
        let active = self.store.active_id();
        let stored: usize = self
            .store
            .chapters()
            .into_iter()
            .filter(|chapter| Some(chapter.id.as_str()) != active)
            .map(|chapter| word_count(&chapter.content))
            .sum();
        match active {
            Some(_) => stored + word_count(&self.editor.content()),
            None => stored,
        }
    }

    /// Adds an outline item; its chapter is created on first selection.
    pub fn add_item(
        &mut self,
        section: SectionKind,
        title: impl Into<String>,
    ) -> Result<ChapterId, OutlineError> {
        self.outline.add_item(section, title)
    }

    /// Renames an outline item and the chapter behind it.
    pub fn rename_item(&mut self, id: &str, title: impl Into<String>) -> Result<(), OutlineError> {
        self.outline.rename_item(id, title)?;
        if self.store.contains(id) {
            if let Some(item) = self.outline.select(id) {
                self.store.get_mut(id).set_title(item.title.as_str());
            }
        }
        Ok(())
    }

    pub fn set_included(&mut self, id: &str, included: bool) -> Result<(), OutlineError> {
        self.outline.set_included(id, included)
    }

    pub fn move_item(&mut self, id: &str, index: usize) -> Result<(), OutlineError> {
        self.outline.move_item(id, index)
    }

    pub fn project_title(&self) -> &str {
        &self.project_title
    }

    /// Sets the project title; blank titles reset to the default.
    pub fn set_project_title(&mut self, title: &str) {
        let trimmed = title.trim();
        self.project_title = if trimmed.is_empty() {
            DEFAULT_PROJECT_TITLE.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Applies imported Markdown as the content of the active chapter.
    pub fn import_markdown(&mut self, markdown: &str) -> TextStats {
        self.editor.set_content(markdown);
        self.store.save(&self.editor);
        info!(
            "event=markdown_import module=session status=ok active={} bytes={}",
            self.store.active_id().unwrap_or("none"),
            markdown.len()
        );
        self.refresh_stats()
    }

    /// Returns the canonical Markdown to export.
    ///
    /// # Errors
    /// - `ExportWarning::EmptyContent` when there is nothing but whitespace.
    pub fn export_markdown(&self) -> Result<String, ExportWarning> {
        let content = self.editor.content();
        if content.trim().is_empty() {
            warn!("event=markdown_export module=session status=skipped reason=empty_content");
            return Err(ExportWarning::EmptyContent);
        }
        Ok(content)
    }

    /// Whole-document snapshot using the live buffer for the active chapter.
    pub fn snapshot(&self) -> DocumentSnapshot {
        let active = self.store.active_id();
        let live_content = active.map(|_| self.editor.content());
        let resolve = |chapter: &Chapter| {
            let mut chapter = chapter.clone();
            if let Some(content) = &live_content {
                if Some(chapter.id.as_str()) == active {
                    chapter.content = content.clone();
                }
            }
            chapter
        };

        let mut seen = HashSet::new();
        let mut chapters = Vec::with_capacity(self.store.len());
        for id in self.outline.item_ids() {
            if let Some(chapter) = self.store.find(&id) {
                chapters.push(resolve(chapter));
                seen.insert(id);
            }
        }
        for chapter in self.store.chapters() {
            if !seen.contains(&chapter.id) {
                chapters.push(resolve(chapter));
            }
        }

        DocumentSnapshot {
            project_title: self.project_title.clone(),
            chapters,
        }
    }

    fn refresh_stats(&mut self) -> TextStats {
        self.stats = stats(&self.editor.plain_text());
        self.stats
    }
}
