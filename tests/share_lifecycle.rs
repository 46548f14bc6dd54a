use std::time::Duration;

use htmlreader::compose::compose;
use htmlreader::share::{
    LocalShareStore, ManualClock, ShareError, ShareStore, expired_notice, share_id_from, share_url,
};
use htmlreader::source::SourceSet;
use url::Url;

const TTL: Duration = Duration::from_secs(25 * 60);

fn record_files(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0)
}

#[test]
fn test_link_round_trip_opens_same_preview() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(10_000);
    let store = LocalShareStore::with_clock(dir.path(), TTL, &clock);
    let sources = SourceSet::new("<h1>shared</h1>", "h1 { color: teal; }", "console.log('v')");

    let record = store.create(&sources).unwrap();
    let base = Url::parse("https://play.example.com/s").unwrap();
    let link = share_url(&base, &record.id);
    let id = share_id_from(link.as_str()).unwrap();

    let opened = store.resolve(&id).unwrap();
    assert_eq!(opened.sources, sources);
    assert_eq!(compose(&opened.sources), compose(&sources));
}

#[test]
fn test_link_expires_after_lifetime() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(0);
    let store = LocalShareStore::with_clock(dir.path(), TTL, &clock);
    let record = store.create(&SourceSet::new("<p>x</p>", "", "")).unwrap();

    clock.advance(TTL - Duration::from_millis(1));
    assert!(store.get(&record.id).is_ok());

    clock.advance(Duration::from_millis(2));
    assert!(matches!(store.get(&record.id), Err(ShareError::NotFound)));
    assert_eq!(record_files(dir.path()), 0);
    assert!(expired_notice(TTL).contains("25 minutes"));
}

#[test]
fn test_sweep_removes_only_expired_records() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(0);
    let store = LocalShareStore::with_clock(dir.path(), TTL, &clock);
    store.create(&SourceSet::default()).unwrap();
    store.create(&SourceSet::default()).unwrap();

    clock.advance(Duration::from_secs(20 * 60));
    let fresh = store.create(&SourceSet::new("<p>fresh</p>", "", "")).unwrap();

    clock.advance(Duration::from_secs(6 * 60));
    assert_eq!(store.sweep().unwrap(), 2);
    assert_eq!(record_files(dir.path()), 1);
    assert!(store.get(&fresh.id).is_ok());
}

#[test]
fn test_resolve_counts_views() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(0);
    let store = LocalShareStore::with_clock(dir.path(), TTL, &clock);
    let record = store.create(&SourceSet::default()).unwrap();

    store.resolve(&record.id).unwrap();
    store.resolve(&record.id).unwrap();

    assert_eq!(store.get(&record.id).unwrap().view_count, 2);
}

#[test]
fn test_unknown_link_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalShareStore::new(dir.path(), TTL);
    let id = share_id_from("https://play.example.com/s?id=nonexistent").unwrap();
    assert!(matches!(store.resolve(&id), Err(ShareError::NotFound)));
}
