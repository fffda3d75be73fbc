#![allow(dead_code)]

use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use whitelist_sync::engine::{
    Downloader, FetchError, FetchOrigin, Fetched, ListConsumer, Source, SourceFetcher,
};

/// Downloader serving canned bodies per URL; unknown URLs fail.
#[derive(Default)]
pub struct MockDownloader {
    bodies: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl MockDownloader {
    pub fn serve(&self, url: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    pub fn fail(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Downloader for MockDownloader {
    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.bodies.lock().unwrap().get(url) {
            Some(body) => Ok(Bytes::from(body.clone())),
            None => Err(FetchError::network(url, "connection refused")),
        }
    }
}

/// Fetcher that blocks every fetch until the gate is opened.
pub struct GatedFetcher {
    body: String,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedFetcher {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(1024);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SourceFetcher for GatedFetcher {
    async fn fetch(&self, _source: &Source, _max_age: Duration) -> Result<Fetched, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = self.gate.acquire().await.unwrap();
        Ok(Fetched::new(
            FetchOrigin::Network,
            std::io::Cursor::new(self.body.clone().into_bytes()),
        ))
    }
}

/// Consumer that records every list it receives, optionally failing.
#[derive(Default)]
pub struct RecordingConsumer {
    pub applied: Mutex<Vec<Vec<String>>>,
    pub fail: bool,
}

impl RecordingConsumer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn applied(&self) -> Vec<Vec<String>> {
        self.applied.lock().unwrap().clone()
    }
}

impl ListConsumer for RecordingConsumer {
    fn apply(&self, names: Vec<String>) -> anyhow::Result<()> {
        self.applied.lock().unwrap().push(names);
        if self.fail {
            anyhow::bail!("target list is not writable");
        }
        Ok(())
    }
}

pub async fn read_all(fetched: Fetched) -> String {
    let mut reader = fetched.reader;
    let mut content = String::new();
    reader.read_to_string(&mut content).await.unwrap();
    content
}

/// Backdates a cache file's modification time.
pub fn age_file(path: &Path, age: Duration) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
