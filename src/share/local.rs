use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::SourceSet;

use super::{Clock, ShareError, ShareRecord, ShareStore, SystemClock, is_valid_id, new_share_id};

const RECORD_PREFIX: &str = "share_";
const RECORD_SUFFIX: &str = ".json";

/// Client-local share storage: one JSON file per record in a directory.
///
/// Every record expires `ttl` after creation. Expiry is enforced on read
/// (an expired record is NotFound and deleted on the spot) and by
/// [`sweep`](Self::sweep), which the host runs periodically.
#[derive(Debug, Clone)]
pub struct LocalShareStore<C = SystemClock> {
    dir: PathBuf,
    ttl: Duration,
    clock: C,
}

impl LocalShareStore<SystemClock> {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self::with_clock(dir, ttl, SystemClock)
    }
}

impl<C: Clock> LocalShareStore<C> {
    pub fn with_clock(dir: impl Into<PathBuf>, ttl: Duration, clock: C) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{RECORD_PREFIX}{id}{RECORD_SUFFIX}"))
    }

    fn write_record(&self, record: &ShareRecord) -> Result<(), ShareError> {
        fs::create_dir_all(&self.dir).map_err(|source| ShareError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.record_path(&record.id);
        let staging = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(record)?;
        fs::write(&staging, body).map_err(|source| ShareError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| ShareError::Io { path, source })
    }

    fn read_record(path: &Path) -> Result<ShareRecord, ShareError> {
        let body = match fs::read(path) {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(ShareError::NotFound),
            Err(source) => {
                return Err(ShareError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_slice(&body).map_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "unreadable share record");
            ShareError::NotFound
        })
    }

    /// Delete every expired record. Returns how many were removed.
    ///
    /// # Errors
    /// Returns an error if the store directory exists but cannot be listed.
    pub fn sweep(&self) -> Result<usize, ShareError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(ShareError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let now = self.clock.now_ms();
        let mut removed = 0;
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            let is_record = path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
                name.starts_with(RECORD_PREFIX) && name.ends_with(RECORD_SUFFIX)
            });
            if !is_record {
                continue;
            }
            let Ok(record) = Self::read_record(&path) else {
                continue;
            };
            if record.is_expired(now) && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "swept expired shares");
        }
        Ok(removed)
    }
}

impl<C: Clock> ShareStore for LocalShareStore<C> {
    fn create(&self, sources: &SourceSet) -> Result<ShareRecord, ShareError> {
        let now = self.clock.now_ms();
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let record = ShareRecord {
            id: new_share_id(),
            sources: sources.clone(),
            created_at: now,
            expires_at: Some(now.saturating_add(ttl_ms)),
            view_count: 0,
        };
        self.write_record(&record)?;
        tracing::info!(id = %record.id, "share created");
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<ShareRecord, ShareError> {
        if !is_valid_id(id) {
            return Err(ShareError::NotFound);
        }
        let path = self.record_path(id);
        let record = Self::read_record(&path)?;
        if record.id != id {
            return Err(ShareError::NotFound);
        }
        if record.is_expired(self.clock.now_ms()) {
            if let Err(err) = fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %err, "failed to remove expired share");
            }
            return Err(ShareError::NotFound);
        }
        Ok(record)
    }

    fn touch(&self, id: &str) {
        let result = self.get(id).and_then(|mut record| {
            record.view_count += 1;
            self.write_record(&record)
        });
        if let Err(err) = result {
            tracing::debug!(id, error = %err, "failed to record share view");
        }
    }
}
