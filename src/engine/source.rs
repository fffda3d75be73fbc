use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use url::Url;

// Keeps cache file names under common filesystem limits (255 bytes).
const MAX_KEY_LEN: usize = 200;

/// A configured whitelist URL together with its derived cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    url: Arc<str>,
    cache_key: Arc<str>,
    parsed: Result<Url, String>,
}

impl Source {
    pub fn new(url: impl Into<Arc<str>>) -> Self {
        let url = url.into();
        let cache_key = cache_key_for(&url).into();
        let parsed = Url::parse(url.trim()).map_err(|e| e.to_string());
        Self {
            url,
            cache_key,
            parsed,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// The parsed URL, or why it could not be parsed.
    pub fn parsed(&self) -> Result<&Url, &str> {
        self.parsed.as_ref().map_err(|e| e.as_str())
    }
}

/// Maps a URL to a file name that stays readable in the cache directory.
pub fn cache_key_for(url: &str) -> String {
    let mut key: String = url
        .chars()
        .map(|c| match c {
            ':' | '/' | '?' | '\\' | '*' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if key.is_empty() || key == "." || key == ".." {
        key = key.replace('.', "_");
        key.push('_');
    }

    if key.len() > MAX_KEY_LEN {
        let mut cut = MAX_KEY_LEN;
        while !key.is_char_boundary(cut) {
            cut -= 1;
        }
        key.truncate(cut);

        let mut hasher = FxHasher::default();
        url.hash(&mut hasher);
        key.push_str(&format!("-{:016x}", hasher.finish()));
    }

    key
}
