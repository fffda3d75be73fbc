use super::source::Source;
use super::state::ReloadState;
use super::traits::{ListConsumer, SourceFetcher};
use crate::executor::Executor;
use crate::stats::StatsCollector;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::runtime::Handle;
use tracing::{debug, error, info};

/// Called on the designated executor with the number of gathered names.
pub type OnComplete = Box<dyn FnOnce(usize) + Send + 'static>;

/// Runs fetch-and-merge passes in the background, at most one at a time.
pub struct Reloader {
    fetcher: Arc<dyn SourceFetcher>,
    consumer: Arc<dyn ListConsumer>,
    executor: Arc<dyn Executor>,
    stats: Arc<StatsCollector>,
    state: ReloadState,
    runtime: Handle,
}

impl Reloader {
    /// Must be called from within a tokio runtime; reloads are spawned onto it.
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        consumer: Arc<dyn ListConsumer>,
        executor: Arc<dyn Executor>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self::with_runtime(fetcher, consumer, executor, stats, Handle::current())
    }

    pub fn with_runtime(
        fetcher: Arc<dyn SourceFetcher>,
        consumer: Arc<dyn ListConsumer>,
        executor: Arc<dyn Executor>,
        stats: Arc<StatsCollector>,
        runtime: Handle,
    ) -> Self {
        Self {
            fetcher,
            consumer,
            executor,
            stats,
            state: ReloadState::new(),
            runtime,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Starts a reload unless one is already in flight.
    ///
    /// Returns `false` when the request was dropped; `on_complete` is not
    /// called in that case. Never blocks the caller.
    pub fn reload(
        &self,
        sources: Arc<[Source]>,
        cache_ttl: Duration,
        on_complete: Option<OnComplete>,
    ) -> bool {
        let Some(guard) = self.state.try_begin() else {
            self.stats.inc_dropped();
            debug!("Reload already in progress, request dropped");
            return false;
        };
        self.stats.inc_reloads();

        let fetcher = self.fetcher.clone();
        let consumer = self.consumer.clone();
        let executor = self.executor.clone();
        let stats = self.stats.clone();

        self.runtime.spawn(async move {
            let names = collect_names(fetcher.as_ref(), &sources, cache_ttl, &stats).await;

            let apply = Box::new(move || {
                let _guard = guard;
                // Grab the count here as the consumer may extend the list
                let count = names.len();
                info!("Registering {} whitelisted names...", count);

                if let Err(e) = consumer.apply(names) {
                    stats.inc_consumer_failures();
                    error!("Consumer apply failed: {:#}", e);
                }
                stats.record_count(count);

                if let Some(done) = on_complete {
                    done(count);
                }
            });

            if let Err(e) = executor.execute(apply) {
                error!("Failed to hand merged list to executor: {}", e);
            }
        });

        true
    }
}

/// Concatenates the lines of every source in order, skipping sources that fail.
pub async fn collect_names(
    fetcher: &dyn SourceFetcher,
    sources: &[Source],
    cache_ttl: Duration,
    stats: &StatsCollector,
) -> Vec<String> {
    let mut names = Vec::new();

    for source in sources {
        let fetched = match fetcher.fetch(source, cache_ttl).await {
            Ok(fetched) => fetched,
            Err(e) => {
                stats.inc_fetch_failures();
                error!("Failed to load whitelist from source {}: {}", source.url(), e);
                continue;
            }
        };
        stats.record_fetch(fetched.origin);

        let before = names.len();
        match read_lines(fetched.reader, &mut names).await {
            Ok(()) => debug!(
                "Loaded {} names from {} ({:?})",
                names.len() - before,
                source.url(),
                fetched.origin
            ),
            Err(e) => {
                stats.inc_read_failures();
                error!(
                    "Failed to read whitelist from source {} after {} names: {}",
                    source.url(),
                    names.len() - before,
                    e
                );
            }
        }
    }

    names
}

/// Appends every line of `reader` to `names`, stripping `\n` / `\r\n`.
///
/// Bytes that are not valid UTF-8 become U+FFFD instead of ending the read;
/// only I/O errors stop early, keeping the lines read so far.
async fn read_lines(
    reader: impl AsyncRead + Unpin,
    names: &mut Vec<String>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        names.push(String::from_utf8_lossy(&buf).into_owned());
    }
}
