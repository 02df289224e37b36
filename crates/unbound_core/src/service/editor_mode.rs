//! Editing mode state machine.
//!
//! # Responsibility
//! - Own the live editor buffer in the representation of the current mode.
//! - Convert the buffer on mode switches and notify the host.
//!
//! # Invariants
//! - `content()` always returns canonical Markdown.
//! - `set_content()` always takes canonical Markdown.
//! - Switching to the current mode is a no-op and emits nothing.
//! - Conversion never fails; see `convert`.

use crate::convert::{lossy_features, markdown_to_rich, rich_to_markdown};
use crate::model::rich::RichDoc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Editing mode of the writing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Markdown,
    RichText,
}

impl EditorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::RichText => "rich_text",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Markdown => Self::RichText,
            Self::RichText => Self::Markdown,
        }
    }
}

impl Display for EditorMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification emitted after a mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: EditorMode,
    pub to: EditorMode,
}

/// Working buffer in the representation implied by the mode.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveContent {
    Markdown(String),
    Rich(RichDoc),
}

impl LiveContent {
    pub fn mode(&self) -> EditorMode {
        match self {
            Self::Markdown(_) => EditorMode::Markdown,
            Self::Rich(_) => EditorMode::RichText,
        }
    }

    fn from_markdown(markdown: &str, mode: EditorMode) -> Self {
        match mode {
            EditorMode::Markdown => Self::Markdown(markdown.to_string()),
            EditorMode::RichText => Self::Rich(markdown_to_rich(markdown)),
        }
    }

    fn to_markdown(&self) -> String {
        match self {
            Self::Markdown(markdown) => markdown.clone(),
            Self::Rich(doc) => rich_to_markdown(doc),
        }
    }
}

/// Edit reported by the editor surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEdit {
    /// Full Markdown text of a Markdown surface.
    Markdown(String),
    /// Document of a rich surface.
    Rich(RichDoc),
    /// HTML exported by a rich surface.
    Html(String),
}

impl LiveEdit {
    fn kind(&self) -> &'static str {
        match self {
            Self::Markdown(_) => "markdown",
            Self::Rich(_) => "rich",
            Self::Html(_) => "html",
        }
    }
}

/// Errors from editor buffer updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The edit does not match the representation of the current mode.
    ModeMismatch {
        mode: EditorMode,
        edit: &'static str,
    },
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModeMismatch { mode, edit } => {
                write!(f, "{edit} edit cannot be applied in {mode} mode")
            }
        }
    }
}

impl Error for EditorError {}

/// Surface the chapter store flushes to and loads from.
///
/// Both directions use canonical Markdown.
pub trait EditorSurface {
    fn content(&self) -> String;
    fn set_content(&mut self, markdown: &str);
}

/// Callback invoked after every effective mode switch.
pub type ModeChangeCallback = Box<dyn FnMut(ModeChange)>;

/// Two-state editing mode controller holding the live buffer.
pub struct EditorModeController {
    live: LiveContent,
    on_mode_change: Option<ModeChangeCallback>,
}

impl Default for EditorModeController {
    fn default() -> Self {
        Self::new(EditorMode::default())
    }
}

impl std::fmt::Debug for EditorModeController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorModeController")
            .field("live", &self.live)
            .field("has_mode_change_callback", &self.on_mode_change.is_some())
            .finish()
    }
}

impl EditorModeController {
    /// Creates an empty controller in `mode`.
    pub fn new(mode: EditorMode) -> Self {
        Self {
            live: LiveContent::from_markdown("", mode),
            on_mode_change: None,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.live.mode()
    }

    pub fn live_content(&self) -> &LiveContent {
        &self.live
    }

    /// Registers the mode-change callback, replacing any previous one.
    pub fn set_mode_change_callback(&mut self, callback: impl FnMut(ModeChange) + 'static) {
        self.on_mode_change = Some(Box::new(callback));
    }

    pub fn clear_mode_change_callback(&mut self) {
        self.on_mode_change = None;
    }

    /// Switches mode, converting the live buffer.
    ///
    /// Returns `false` without side effects when `mode` is already active.
    pub fn set_mode(&mut self, mode: EditorMode) -> bool {
        let from = self.mode();
        if from == mode {
            return false;
        }

        self.live = match &self.live {
            LiveContent::Markdown(markdown) => LiveContent::Rich(markdown_to_rich(markdown)),
            LiveContent::Rich(doc) => {
                let dropped = lossy_features(doc);
                if !dropped.is_empty() {
                    debug!(
                        "event=mode_switch_lossy module=editor dropped_features={}",
                        dropped.len()
                    );
                }
                LiveContent::Markdown(rich_to_markdown(doc))
            }
        };
        info!(
            "event=mode_switch module=editor status=ok from={} to={}",
            from, mode
        );

        if let Some(callback) = self.on_mode_change.as_mut() {
            callback(ModeChange { from, to: mode });
        }
        true
    }

    /// Switches to the other mode and returns the transition.
    pub fn toggle_mode(&mut self) -> ModeChange {
        let from = self.mode();
        let to = from.toggled();
        self.set_mode(to);
        ModeChange { from, to }
    }

    /// Applies an edit reported by the surface.
    ///
    /// # Errors
    /// - `EditorError::ModeMismatch` when the edit representation does not
    ///   belong to the current mode. The buffer is left untouched.
    pub fn apply_edit(&mut self, edit: LiveEdit) -> Result<(), EditorError> {
        let mode = self.mode();
        self.live = match (mode, edit) {
            (EditorMode::Markdown, LiveEdit::Markdown(markdown)) => LiveContent::Markdown(markdown),
            (EditorMode::RichText, LiveEdit::Rich(doc)) => LiveContent::Rich(doc),
            (EditorMode::RichText, LiveEdit::Html(html)) => {
                LiveContent::Rich(RichDoc::from_html(&html))
            }
            (mode, edit) => {
                return Err(EditorError::ModeMismatch {
                    mode,
                    edit: edit.kind(),
                })
            }
        };
        Ok(())
    }

    /// Text as the surface displays it, used for statistics.
    pub fn plain_text(&self) -> String {
        match &self.live {
            LiveContent::Markdown(markdown) => markdown.clone(),
            LiveContent::Rich(doc) => doc.plain_text(),
        }
    }

    /// HTML for a rich surface; `None` in Markdown mode.
    pub fn rich_html(&self) -> Option<String> {
        match &self.live {
            LiveContent::Markdown(_) => None,
            LiveContent::Rich(doc) => Some(doc.to_html()),
        }
    }

    /// Rich formatting actions are only available in rich-text mode.
    pub fn formatting_enabled(&self) -> bool {
        self.mode() == EditorMode::RichText
    }
}

impl EditorSurface for EditorModeController {
    fn content(&self) -> String {
        self.live.to_markdown()
    }

    fn set_content(&mut self, markdown: &str) {
        self.live = LiveContent::from_markdown(markdown, self.mode());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn starts_in_markdown_with_empty_content() {
        let editor = EditorModeController::default();
        assert_eq!(editor.mode(), EditorMode::Markdown);
        assert_eq!(editor.content(), "");
        assert!(!editor.formatting_enabled());
    }

    #[test]
    fn switching_to_same_mode_is_silent() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut editor = EditorModeController::default();
        editor.set_mode_change_callback(move |change| sink.borrow_mut().push(change));

        assert!(!editor.set_mode(EditorMode::Markdown));
        assert!(events.borrow().is_empty());

        assert!(editor.set_mode(EditorMode::RichText));
        assert_eq!(
            *events.borrow(),
            vec![ModeChange {
                from: EditorMode::Markdown,
                to: EditorMode::RichText,
            }]
        );
    }

    #[test]
    fn rich_mode_keeps_canonical_markdown() {
        let mut editor = EditorModeController::new(EditorMode::RichText);
        editor.set_content("Hello **world**");
        assert!(matches!(editor.live_content(), LiveContent::Rich(_)));
        assert_eq!(editor.content(), "Hello **world**");
        assert_eq!(editor.plain_text(), "Hello world");
        assert_eq!(
            editor.rich_html().as_deref(),
            Some("<p>Hello <strong>world</strong></p>")
        );
    }

    #[test]
    fn edits_must_match_mode() {
        let mut editor = EditorModeController::default();
        let err = editor
            .apply_edit(LiveEdit::Html("<p>x</p>".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::ModeMismatch {
                mode: EditorMode::Markdown,
                edit: "html",
            }
        );

        editor.toggle_mode();
        editor
            .apply_edit(LiveEdit::Html("<p><em>x</em></p>".to_string()))
            .expect("html edits apply in rich mode");
        assert_eq!(editor.content(), "*x*");
    }
}
