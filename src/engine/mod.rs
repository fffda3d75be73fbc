mod cache;
mod downloader;
mod error;
mod fetcher;
mod manager;
mod source;
pub mod state;
mod timer;
mod traits;

pub use cache::CacheStore;
pub use downloader::HttpDownloader;
pub use error::FetchError;
pub use fetcher::{CachedFetcher, FetchOrigin, Fetched};
pub use manager::{collect_names, OnComplete, Reloader};
pub use source::{cache_key_for, Source};
pub use state::{ReloadGuard, ReloadState};
pub use timer::ReloadTimer;
pub use traits::{Downloader, ListConsumer, SourceFetcher};
