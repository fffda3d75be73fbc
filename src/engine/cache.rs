use super::error::FetchError;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Directory of cached source bodies, one file per cache key.
/// File modification time is the only freshness signal.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, cache_key: &str) -> PathBuf {
        self.dir.join(cache_key)
    }

    /// Age of the entry, or None if there is no readable entry metadata.
    pub async fn age(&self, cache_key: &str) -> Option<Duration> {
        let meta = fs::metadata(self.path_for(cache_key)).await.ok()?;
        if !meta.is_file() {
            return None;
        }
        let modified = meta.modified().ok()?;
        // mtime in the future counts as brand new
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    pub async fn open(&self, cache_key: &str) -> Result<File, FetchError> {
        let path = self.path_for(cache_key);
        File::open(&path)
            .await
            .map_err(|source| FetchError::CacheReadFailed { path, source })
    }

    /// Replaces the entry through a temp file so readers never see a partial body.
    pub async fn store(&self, cache_key: &str, body: &[u8]) -> Result<(), FetchError> {
        let path = self.path_for(cache_key);
        let tmp = self.dir.join(format!(".{}.tmp", cache_key));
        let write_err = |source| FetchError::CacheWriteFailed {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(write_err)?;

        let result = async {
            let mut file = File::create(&tmp).await?;
            file.write_all(body).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        Ok(())
    }
}
