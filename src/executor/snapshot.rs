use std::fs;
use std::path::{Path, PathBuf};

use crate::compose::RenderDocument;

use super::{BoundaryError, IsolationBoundary, Outbox};

/// Publishes each preview as a complete file, replaced atomically.
///
/// The document is written next to the target and renamed over it, so a
/// browser reloading the path never observes a half-written snapshot.
/// Diagnostics from a page opened this way go to the browser's own
/// console; nothing is relayed back.
#[derive(Debug, Clone)]
pub struct SnapshotBoundary {
    path: PathBuf,
}

impl SnapshotBoundary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "preview.html".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

impl IsolationBoundary for SnapshotBoundary {
    fn replace(&mut self, document: &RenderDocument, _outbox: Outbox) -> Result<(), BoundaryError> {
        let staging = self.staging_path();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BoundaryError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&staging, document.as_str()).map_err(|source| BoundaryError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            BoundaryError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn describe(&self) -> String {
        format!("snapshot: {}", self.path.display())
    }
}
