use super::cache::CacheStore;
use super::error::FetchError;
use super::source::Source;
use super::traits::{Downloader, SourceFetcher};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

/// Where the content returned by a fetch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Cache entry younger than the max age; no network access.
    Cache,
    /// Freshly downloaded; the cache entry was rewritten.
    Network,
    /// Download failed and an older cache entry was served instead.
    StaleCache,
}

pub struct Fetched {
    pub origin: FetchOrigin,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl Fetched {
    pub fn new(origin: FetchOrigin, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            origin,
            reader: Box::new(reader),
        }
    }
}

impl fmt::Debug for Fetched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetched")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Fetcher that serves sources from a local cache directory and refreshes
/// them over the network once they are older than the requested max age.
pub struct CachedFetcher {
    store: CacheStore,
    downloader: Arc<dyn Downloader>,
}

impl CachedFetcher {
    pub fn new(store: CacheStore, downloader: Arc<dyn Downloader>) -> Self {
        Self { store, downloader }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn is_fresh(age: Duration, max_age: Duration) -> bool {
        !max_age.is_zero() && age <= max_age
    }
}

#[async_trait::async_trait]
impl SourceFetcher for CachedFetcher {
    async fn fetch(&self, source: &Source, max_age: Duration) -> Result<Fetched, FetchError> {
        let key = source.cache_key();
        let cached_age = self.store.age(key).await;

        if let Some(age) = cached_age {
            if Self::is_fresh(age, max_age) {
                match self.store.open(key).await {
                    Ok(file) => {
                        debug!("Using cached copy of {} (age {:?})", source.url(), age);
                        return Ok(Fetched::new(FetchOrigin::Cache, file));
                    }
                    Err(e) => warn!("{}, refetching", e),
                }
            }
        }

        let download = match source.parsed() {
            Ok(_) => self.downloader.download(source.url()).await,
            Err(reason) => Err(FetchError::MalformedSource {
                url: source.url().to_string(),
                reason: reason.to_string(),
            }),
        };

        match download {
            Ok(body) => {
                info!("Fetched {} bytes from {}", body.len(), source.url());
                if let Err(e) = self.store.store(key, &body).await {
                    warn!("{}", e);
                }
                Ok(Fetched::new(FetchOrigin::Network, Cursor::new(body)))
            }
            Err(err) => {
                if cached_age.is_some() {
                    match self.store.open(key).await {
                        Ok(file) => {
                            warn!("{}, falling back to cached copy", err);
                            return Ok(Fetched::new(FetchOrigin::StaleCache, file));
                        }
                        Err(e) => warn!("{}", e),
                    }
                }
                Err(err)
            }
        }
    }
}
