//! Application state: buffers, active tab and theme.
//!
//! State is an explicit value passed to whoever needs it. Persisting it is
//! an explicit [`AppState::save`], done by the host after each transition.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::source::{Language, SourceSet};
use crate::templates::{Template, default_sources};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    sources: SourceSet,
    active: Language,
    dark_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            active: Language::Markup,
            dark_mode: false,
        }
    }
}

impl AppState {
    pub const fn new(sources: SourceSet) -> Self {
        Self {
            sources,
            active: Language::Markup,
            dark_mode: false,
        }
    }

    pub const fn sources(&self) -> &SourceSet {
        &self.sources
    }

    pub fn field(&self, language: Language) -> &str {
        self.sources.get(language)
    }

    /// Replace one buffer. Returns true if it changed.
    pub fn set_field(&mut self, language: Language, text: impl Into<String>) -> bool {
        self.sources.set(language, text)
    }

    /// Replace all three buffers. Returns true if anything changed.
    pub fn set_sources(&mut self, sources: SourceSet) -> bool {
        if self.sources == sources {
            return false;
        }
        self.sources = sources;
        true
    }

    pub const fn active(&self) -> Language {
        self.active
    }

    pub const fn select(&mut self, language: Language) {
        self.active = language;
    }

    pub const fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub const fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
    }

    pub const fn toggle_theme(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// Restore the default buffers. Tab and theme are kept.
    pub fn reset(&mut self) -> bool {
        self.set_sources(default_sources())
    }

    pub fn apply_template(&mut self, template: &Template) -> bool {
        self.set_sources(template.sources())
    }

    /// Load saved state, or defaults if no file exists yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&body).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// # Errors
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let io = |source| StateError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        let body = serde_json::to_string_pretty(self).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, body).map_err(io)
    }
}

/// Where a project's state file lives.
pub fn state_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".htmlreader").join("state.json")
}
