use super::error::FetchError;
use super::fetcher::Fetched;
use super::source::Source;
use bytes::Bytes;
use std::time::Duration;

/// The "Transport" used to pull a source over the network.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads the full body of `url`.
    async fn download(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Produces a readable stream of a source's content.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Returns the content of `source`, from cache when younger than `max_age`.
    async fn fetch(&self, source: &Source, max_age: Duration) -> Result<Fetched, FetchError>;
}

/// Downstream consumer of the merged list. Runs on the designated executor.
pub trait ListConsumer: Send + Sync {
    /// Takes ownership of the merged list; free to extend or reorder it.
    fn apply(&self, names: Vec<String>) -> anyhow::Result<()>;
}
