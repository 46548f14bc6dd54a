//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, RenderRequest, ToastLevel};
pub use update::{Message, update};

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::config::ThemeMode;
use crate::diagnostics::DEFAULT_LOG_CAP;
use crate::executor::{BoundaryError, IsolationBoundary, ProcessBoundary, SnapshotBoundary};
use crate::share::{DEFAULT_BASE_URL, DEFAULT_SHARE_TTL, LocalShareStore};
use crate::source::SourceSet;

/// Debounce window between the last edit and the preview update.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    project_dir: PathBuf,
    debounce_ms: u64,
    runner: Option<String>,
    out: Option<PathBuf>,
    share_dir: PathBuf,
    share_ttl: Duration,
    base_url: Option<Url>,
    log_cap: usize,
    theme: ThemeMode,
    shared: Option<SourceSet>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the project in `project_dir`.
    pub fn new(project_dir: PathBuf) -> Self {
        let share_dir = crate::config::default_share_dir();
        Self {
            project_dir,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            runner: None,
            out: None,
            share_dir,
            share_ttl: DEFAULT_SHARE_TTL,
            base_url: None,
            log_cap: DEFAULT_LOG_CAP,
            theme: ThemeMode::Auto,
            shared: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    pub const fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Run previews through an external runner command instead of a file.
    pub fn with_runner(mut self, runner: Option<String>) -> Self {
        self.runner = runner;
        self
    }

    /// Where snapshot previews are written.
    pub fn with_out(mut self, out: Option<PathBuf>) -> Self {
        self.out = out;
        self
    }

    pub fn with_share_dir(mut self, dir: PathBuf) -> Self {
        self.share_dir = dir;
        self
    }

    pub const fn with_share_ttl(mut self, ttl: Duration) -> Self {
        self.share_ttl = ttl;
        self
    }

    pub fn with_base_url(mut self, url: Option<Url>) -> Self {
        self.base_url = url;
        self
    }

    pub const fn with_log_cap(mut self, cap: usize) -> Self {
        self.log_cap = cap;
        self
    }

    /// Force a palette; `Auto` keeps whatever the project last used.
    pub const fn with_theme(mut self, theme: ThemeMode) -> Self {
        self.theme = theme;
        self
    }

    /// Show a shared snapshot read-only instead of watching the project.
    pub fn with_shared_sources(mut self, sources: Option<SourceSet>) -> Self {
        self.shared = sources;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub const fn is_read_only(&self) -> bool {
        self.shared.is_some()
    }

    /// Snapshot path used when no runner is configured.
    /// Where snapshots go without a runner. Shared views never write into
    /// the directory they were opened from.
    pub fn preview_path(&self) -> PathBuf {
        match (&self.out, &self.shared) {
            (Some(out), _) => out.clone(),
            (None, Some(_)) => shared_preview_path(),
            (None, None) => default_preview_path(&self.project_dir),
        }
    }

    pub(crate) fn share_store(&self) -> LocalShareStore {
        LocalShareStore::new(&self.share_dir, self.share_ttl)
    }

    /// Build the isolation boundary this app renders into.
    ///
    /// # Errors
    /// Returns an error if the runner command line is empty.
    pub fn make_boundary(&self) -> Result<Box<dyn IsolationBoundary>, BoundaryError> {
        match self.runner.as_deref() {
            Some(command) => {
                let boundary = ProcessBoundary::from_command_line(command)?;
                Ok(Box::new(boundary))
            }
            None => Ok(Box::new(SnapshotBoundary::new(self.preview_path()))),
        }
    }
}

/// Default snapshot location inside a project.
pub fn default_preview_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".htmlreader").join("preview.html")
}

/// Default snapshot location for a shared view, private to this process.
pub fn shared_preview_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("htmlreader-shared-{}", std::process::id()))
        .join("preview.html")
}

/// Base URL share links are built on when none is configured.
///
/// # Errors
/// Never in practice; [`DEFAULT_BASE_URL`] is a valid absolute URL.
pub fn default_base_url() -> Result<Url, url::ParseError> {
    Url::parse(DEFAULT_BASE_URL)
}

#[cfg(test)]
mod tests;
