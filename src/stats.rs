use crate::engine::FetchOrigin;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

#[derive(Debug, Default)]
pub struct StatsCollector {
    reloads_started: AtomicU64,
    reloads_dropped: AtomicU64,

    // Per-fetch outcomes
    cache_hits: AtomicU64,
    network_fetches: AtomicU64,
    stale_fallbacks: AtomicU64,
    fetch_failures: AtomicU64,
    read_failures: AtomicU64,

    consumer_failures: AtomicU64,
    last_count: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub reloads_started: u64,
    pub reloads_dropped: u64,
    pub cache_hits: u64,
    pub network_fetches: u64,
    pub stale_fallbacks: u64,
    pub fetch_failures: u64,
    pub read_failures: u64,
    pub consumer_failures: u64,
    pub last_count: u64,
}

impl StatsCollector {
    /// Creates the collector. A non-zero interval spawns a background dumper,
    /// which requires a running tokio runtime.
    pub fn new(log_interval_sec: u64) -> Arc<Self> {
        let stats = Arc::new(Self::default());

        if log_interval_sec > 0 {
            let stats_clone = stats.clone();
            tokio::spawn(async move {
                stats_clone
                    .run_logger(Duration::from_secs(log_interval_sec))
                    .await;
            });
        }

        stats
    }

    pub fn inc_reloads(&self) {
        self.reloads_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dropped(&self) {
        self.reloads_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self, origin: FetchOrigin) {
        let counter = match origin {
            FetchOrigin::Cache => &self.cache_hits,
            FetchOrigin::Network => &self.network_fetches,
            FetchOrigin::StaleCache => &self.stale_fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A source was fetched but its stream broke before the end.
    pub fn inc_read_failures(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_consumer_failures(&self) {
        self.consumer_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_count(&self, count: usize) {
        self.last_count.store(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reloads_started: self.reloads_started.load(Ordering::Relaxed),
            reloads_dropped: self.reloads_dropped.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            stale_fallbacks: self.stale_fallbacks.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            consumer_failures: self.consumer_failures.load(Ordering::Relaxed),
            last_count: self.last_count.load(Ordering::Relaxed),
        }
    }

    async fn run_logger(&self, log_interval: Duration) {
        let mut interval = time::interval(log_interval);
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let s = self.snapshot();
        let fetches = s.cache_hits + s.network_fetches + s.stale_fallbacks + s.fetch_failures;

        info!(
            "STATS DUMP: Reloads: {} (dropped {}), Fetches: {} [cache: {}, network: {}, stale: {}, failed: {}], ReadFailures: {}, ConsumerFailures: {}, LastCount: {}",
            s.reloads_started,
            s.reloads_dropped,
            fetches,
            s.cache_hits,
            s.network_fetches,
            s.stale_fallbacks,
            s.fetch_failures,
            s.read_failures,
            s.consumer_failures,
            s.last_count
        );
    }
}
