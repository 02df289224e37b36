//! Session configuration.
//!
//! # Responsibility
//! - Load writing-session settings from JSON.
//! - Validate settings before a session or the logger uses them.
//!
//! # Invariants
//! - Missing fields take their defaults.
//! - A validated `log_dir` is absolute and `log_level` is a known level.

use crate::service::editor_mode::EditorMode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Title used for new projects.
pub const DEFAULT_PROJECT_TITLE: &str = "Untitled Project";

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Settings for one writing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Mode the editor starts in.
    pub initial_mode: EditorMode,
    /// Save the active chapter on every content change.
    pub autosave_on_change: bool,
    pub project_title: String,
    /// Overrides `logging::default_log_level()`.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_mode: EditorMode::Markdown,
            autosave_on_change: true,
            project_title: DEFAULT_PROJECT_TITLE.to_string(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks value-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.log_level {
            let normalized = level.trim().to_ascii_lowercase();
            if !KNOWN_LOG_LEVELS.contains(&normalized.as_str()) {
                return Err(ConfigError::InvalidLogLevel(level.clone()));
            }
        }
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() || !Path::new(dir.trim()).is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }

    /// Project title with blank values replaced by the default.
    pub fn effective_project_title(&self) -> &str {
        let trimmed = self.project_title.trim();
        if trimmed.is_empty() {
            DEFAULT_PROJECT_TITLE
        } else {
            trimmed
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidLogLevel(String),
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(dir) => write!(f, "log_dir must be an absolute path, got `{dir}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidLogLevel(_) | Self::RelativeLogDir(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}
