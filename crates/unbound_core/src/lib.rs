//! Core document model for the Unbound writing app.
//! This crate is the single source of truth for chapter, conversion and
//! editing-mode invariants.

pub mod analysis;
pub mod config;
pub mod convert;
pub mod io;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analysis::stats::{stats, word_count, TextStats};
pub use config::{ConfigError, SessionConfig, DEFAULT_PROJECT_TITLE};
pub use convert::{
    html_to_markdown, lossy_features, markdown_to_html, markdown_to_rich, rich_to_markdown,
    LossyFeature,
};
pub use io::{export_markdown_file, import_markdown_file, DocumentIoError, ExportOutcome};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::chapter::{Chapter, ChapterId};
pub use model::outline::{Outline, OutlineError, OutlineItem, OutlineSection, SectionKind};
pub use model::rich::{
    Alignment, Block, BlockFormat, Inline, InlineStyle, ListItem, RichDoc, TextRun,
};
pub use repo::chapter_store::ChapterStore;
pub use service::editor_mode::{
    EditorError, EditorMode, EditorModeController, EditorSurface, LiveContent, LiveEdit,
    ModeChange, ModeChangeCallback,
};
pub use service::session::{ChapterView, DocumentSnapshot, ExportWarning, WritingSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
