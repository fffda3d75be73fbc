//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::engine::{CacheStore, CachedFetcher, HttpDownloader, ListConsumer, Reloader};
use crate::executor::Executor;
use crate::stats::StatsCollector;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = config.logging.level.clone();

        // Connection-level chatter from the HTTP stack is rarely useful here
        for noisy in ["hyper", "reqwest", "rustls"] {
            if !filter.contains(noisy) {
                filter.push_str(&format!(",{}=warn", noisy));
            }
        }

        tracing_subscriber::EnvFilter::new(filter)
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Builds the HTTP-backed, disk-cached reloader described by `config`.
pub fn build_reloader(
    config: &Config,
    consumer: Arc<dyn ListConsumer>,
    executor: Arc<dyn Executor>,
    stats: Arc<StatsCollector>,
) -> Result<Reloader> {
    let downloader = HttpDownloader::new(&config.http).context("Failed to build HTTP client")?;
    let store = CacheStore::new(config.cache_dir());
    info!(
        "Caching {} whitelist source(s) in {}",
        config.sources.len(),
        store.dir().display()
    );

    let fetcher = CachedFetcher::new(store, Arc::new(downloader));
    Ok(Reloader::new(Arc::new(fetcher), consumer, executor, stats))
}
