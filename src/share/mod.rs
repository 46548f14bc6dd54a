//! Share links: keyed, expiring snapshots of a [`SourceSet`].
//!
//! A share stores the three buffers under an opaque id and hands back a
//! link carrying that id as the `id` query parameter. Resolving a link
//! never reveals whether an id expired or never existed; both are
//! [`ShareError::NotFound`].

mod local;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub use local::LocalShareStore;

use crate::source::SourceSet;

/// Lifetime of a share link unless configured otherwise.
pub const DEFAULT_SHARE_TTL: Duration = Duration::from_secs(25 * 60);

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/share";

/// Query parameter carrying the share id.
pub const ID_PARAM: &str = "id";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("link expired or not found")]
    NotFound,
    #[error("share store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode share record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A stored snapshot. Timestamps are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: String,
    pub sources: SourceSet,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub view_count: u64,
}

impl ShareRecord {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at.is_some_and(|expires| now_ms > expires)
    }

    /// Milliseconds left before expiry, `None` for durable records.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now_ms))
    }
}

/// Keyed storage of shared snapshots.
pub trait ShareStore {
    /// Store `sources` under a fresh collision-resistant id.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    fn create(&self, sources: &SourceSet) -> Result<ShareRecord, ShareError>;

    /// Fetch a live record.
    ///
    /// # Errors
    /// Returns [`ShareError::NotFound`] for absent and expired ids alike.
    fn get(&self, id: &str) -> Result<ShareRecord, ShareError>;

    /// Record a view. Best effort: failures are logged, never returned.
    fn touch(&self, id: &str);

    /// Fetch a record and count the view.
    ///
    /// # Errors
    /// Same as [`get`](Self::get); a failed view count never fails this.
    fn resolve(&self, id: &str) -> Result<ShareRecord, ShareError> {
        let record = self.get(id)?;
        self.touch(id);
        Ok(record)
    }
}

/// Source of "now" for expiry decisions.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub const fn new(now_ms: u64) -> Self {
        Self(AtomicU64::new(now_ms))
    }

    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.0.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Generate a new share id: a v4 UUID as 32 lowercase hex digits.
pub fn new_share_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Whether `id` has the shape of an id produced by [`new_share_id`].
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Build the share link for `id` under `base`.
pub fn share_url(base: &Url, id: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().clear().append_pair(ID_PARAM, id);
    url
}

/// Share lifetime for a configured number of minutes, saturating on overflow.
pub const fn ttl_from_minutes(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

/// What a reader sees when a link cannot be resolved.
pub fn expired_notice(ttl: Duration) -> String {
    format!(
        "This shared link has expired or was not found. Share links are valid for {} minutes.",
        ttl.as_secs() / 60
    )
}

/// Extract a share id from a full link or a bare id.
pub fn share_id_from(input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(url) = Url::parse(input) {
        return url
            .query_pairs()
            .find(|(key, _)| key == ID_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty());
    }
    (!input.is_empty()).then(|| input.to_string())
}
