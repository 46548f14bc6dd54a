//! Project directory watching.
//!
//! Uses notify crate for cross-platform file system events. The watcher only
//! reports which buffers were touched; coalescing bursts into one preview
//! update is the render debouncer's job.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::source::Language;

/// Watches a project directory for changes to its three source files.
pub struct ProjectWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    root: PathBuf,
}

impl ProjectWatcher {
    /// Create a watcher for the project in `dir`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(dir: impl AsRef<Path>) -> notify::Result<Self> {
        // Canonicalize so event paths from the OS (which are always absolute
        // and canonical) match our stored paths.
        let root = dir
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| dir.as_ref().to_path_buf());

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drain pending events and return the buffers whose files changed.
    pub fn take_changes(&mut self) -> Vec<Language> {
        let mut changed = BTreeSet::new();
        let mut total_events = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            total_events += 1;
            match event {
                Ok(ev) => changed.extend(self.languages_for(&ev)),
                Err(err) => {
                    tracing::debug!(error = %err, "watch error");
                    crate::perf::log_event("watcher.error", format!("{err}"));
                }
            }
        }

        if total_events > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "total={total_events} changed={changed:?} root={}",
                    self.root.display()
                ),
            );
        }
        changed.into_iter().collect()
    }

    fn languages_for(&self, event: &Event) -> Vec<Language> {
        let mut out = Vec::new();
        for path in &event.paths {
            // Some backends only report the directory itself.
            if path == &self.root {
                return Language::ALL.to_vec();
            }
            let language = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| Language::ALL.into_iter().find(|l| l.file_name() == name));
            if let Some(language) = language {
                out.push(language);
            }
        }
        out
    }
}
