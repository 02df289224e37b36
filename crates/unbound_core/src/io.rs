//! Markdown file import/export for a writing session.
//!
//! # Responsibility
//! - Bridge session import/export to the filesystem.
//!
//! # Invariants
//! - An export with empty content never creates or truncates a file.
//! - Only filesystem failures surface as errors.

use crate::analysis::stats::TextStats;
use crate::service::session::{ExportWarning, WritingSession};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Result of an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { bytes: usize },
    /// Nothing to export; no file was touched.
    SkippedEmpty,
}

/// Filesystem errors for document import/export.
#[derive(Debug)]
pub enum DocumentIoError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for DocumentIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for DocumentIoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
        }
    }
}

/// Reads a UTF-8 Markdown file into the active chapter.
pub fn import_markdown_file(
    session: &mut WritingSession,
    path: impl AsRef<Path>,
) -> Result<TextStats, DocumentIoError> {
    let path = path.as_ref();
    let markdown = std::fs::read_to_string(path).map_err(|source| DocumentIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(session.import_markdown(&markdown))
}

/// Writes the active chapter's canonical Markdown to `path`.
pub fn export_markdown_file(
    session: &WritingSession,
    path: impl AsRef<Path>,
) -> Result<ExportOutcome, DocumentIoError> {
    let path = path.as_ref();
    let markdown = match session.export_markdown() {
        Ok(markdown) => markdown,
        Err(ExportWarning::EmptyContent) => return Ok(ExportOutcome::SkippedEmpty),
    };
    std::fs::write(path, markdown.as_bytes()).map_err(|source| DocumentIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "event=markdown_export module=io status=ok bytes={}",
        markdown.len()
    );
    Ok(ExportOutcome::Written {
        bytes: markdown.len(),
    })
}
