use std::path::PathBuf;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    NetworkFetchFailed { url: String, source: BoxError },
    #[error("malformed source {url}: {reason}")]
    MalformedSource { url: String, reason: String },
    #[error("failed to read cache file {}: {source}", path.display())]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write cache file {}: {source}", path.display())]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        FetchError::NetworkFetchFailed {
            url: url.into(),
            source: source.into(),
        }
    }
}
