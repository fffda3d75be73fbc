mod common;

use common::{age_file, read_all, MockDownloader};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use whitelist_sync::engine::{
    CacheStore, CachedFetcher, FetchError, FetchOrigin, Source, SourceFetcher,
};

const URL: &str = "http://whitelist.example.com/list.php?id=12345";
const HOUR: Duration = Duration::from_secs(3600);

fn setup() -> (tempfile::TempDir, Arc<MockDownloader>, CachedFetcher) {
    let dir = tempfile::tempdir().unwrap();
    let downloader = Arc::new(MockDownloader::default());
    let fetcher = CachedFetcher::new(CacheStore::new(dir.path()), downloader.clone());
    (dir, downloader, fetcher)
}

#[tokio::test]
async fn test_first_fetch_downloads_and_caches() {
    let (dir, downloader, fetcher) = setup();
    downloader.serve(URL, "alice\nbob\n");
    let source = Source::new(URL);

    let fetched = fetcher.fetch(&source, HOUR).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::Network);
    assert_eq!(read_all(fetched).await, "alice\nbob\n");
    assert_eq!(downloader.calls(), 1);

    let cached = dir.path().join(source.cache_key());
    assert_eq!(std::fs::read_to_string(cached).unwrap(), "alice\nbob\n");
}

#[tokio::test]
async fn test_fresh_cache_skips_network() {
    let (_dir, downloader, fetcher) = setup();
    downloader.serve(URL, "alice\n");
    let source = Source::new(URL);

    fetcher.fetch(&source, HOUR).await.unwrap();
    downloader.serve(URL, "changed\n");

    let fetched = fetcher.fetch(&source, HOUR).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::Cache);
    assert_eq!(read_all(fetched).await, "alice\n");
    assert_eq!(downloader.calls(), 1);
}

#[tokio::test]
async fn test_stale_cache_refetches_once_and_refreshes_timestamp() {
    let (dir, downloader, fetcher) = setup();
    downloader.serve(URL, "alice\n");
    let source = Source::new(URL);
    let cached = dir.path().join(source.cache_key());

    fetcher.fetch(&source, HOUR).await.unwrap();
    age_file(&cached, 2 * HOUR);
    downloader.serve(URL, "alice\ncarol\n");

    let fetched = fetcher.fetch(&source, HOUR).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::Network);
    assert_eq!(read_all(fetched).await, "alice\ncarol\n");
    assert_eq!(downloader.calls(), 2);

    let modified = std::fs::metadata(&cached).unwrap().modified().unwrap();
    let age = SystemTime::now().duration_since(modified).unwrap_or_default();
    assert!(age < Duration::from_secs(60), "cache timestamp not refreshed: {:?}", age);
    assert_eq!(std::fs::read_to_string(&cached).unwrap(), "alice\ncarol\n");
}

#[tokio::test]
async fn test_network_failure_falls_back_to_stale_cache() {
    let (dir, downloader, fetcher) = setup();
    downloader.serve(URL, "alice\n");
    let source = Source::new(URL);

    fetcher.fetch(&source, HOUR).await.unwrap();
    age_file(&dir.path().join(source.cache_key()), 2 * HOUR);
    downloader.fail(URL);

    let fetched = fetcher.fetch(&source, HOUR).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::StaleCache);
    assert_eq!(read_all(fetched).await, "alice\n");
    assert_eq!(downloader.calls(), 2);
}

#[tokio::test]
async fn test_network_failure_without_cache_fails() {
    let (_dir, downloader, fetcher) = setup();
    let source = Source::new(URL);

    let err = fetcher.fetch(&source, HOUR).await.unwrap_err();
    assert!(matches!(err, FetchError::NetworkFetchFailed { .. }));
    assert_eq!(downloader.calls(), 1);
}

#[tokio::test]
async fn test_zero_max_age_always_refetches() {
    let (_dir, downloader, fetcher) = setup();
    downloader.serve(URL, "alice\n");
    let source = Source::new(URL);

    for _ in 0..2 {
        let fetched = fetcher.fetch(&source, Duration::ZERO).await.unwrap();
        assert_eq!(fetched.origin, FetchOrigin::Network);
    }
    assert_eq!(downloader.calls(), 2);
}

#[tokio::test]
async fn test_malformed_source_never_hits_network() {
    let (dir, downloader, fetcher) = setup();
    let source = Source::new("not a url");

    let err = fetcher.fetch(&source, HOUR).await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedSource { .. }));
    assert_eq!(downloader.calls(), 0);

    // A cached copy under the same key is still served.
    std::fs::write(dir.path().join(source.cache_key()), "alice\n").unwrap();
    let fetched = fetcher.fetch(&source, Duration::ZERO).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::StaleCache);
    assert_eq!(read_all(fetched).await, "alice\n");
}

#[tokio::test]
async fn test_unwritable_cache_still_returns_body() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the cache directory should be
    let blocked = dir.path().join("cache");
    std::fs::write(&blocked, "").unwrap();

    let downloader = Arc::new(MockDownloader::default());
    downloader.serve(URL, "alice\n");
    let fetcher = CachedFetcher::new(CacheStore::new(&blocked), downloader.clone());

    let fetched = fetcher.fetch(&Source::new(URL), HOUR).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::Network);
    assert_eq!(read_all(fetched).await, "alice\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_fresh_entry_is_refetched() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, downloader, fetcher) = setup();
    let source = Source::new(URL);
    let cached = dir.path().join(source.cache_key());
    std::fs::write(&cached, "old\n").unwrap();
    std::fs::set_permissions(&cached, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::File::open(&cached).is_ok() {
        // root ignores file modes
        return;
    }
    downloader.serve(URL, "alice\n");

    let fetched = fetcher.fetch(&source, HOUR).await.unwrap();
    assert_eq!(fetched.origin, FetchOrigin::Network);
    assert_eq!(read_all(fetched).await, "alice\n");
    assert_eq!(downloader.calls(), 1);
    assert_eq!(std::fs::read_to_string(&cached).unwrap(), "alice\n");
}
