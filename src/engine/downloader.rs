use super::error::FetchError;
use super::traits::Downloader;
use crate::config::HttpConfig;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Downloads whitelist sources over HTTP(S).
pub struct HttpDownloader {
    client: Client,
    max_body_bytes: u64,
}

impl HttpDownloader {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| FetchError::network("<client>", e))?;
        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = reqwest::Url::parse(url.trim()).map_err(|e| FetchError::MalformedSource {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| FetchError::network(url, e))?;

        let mut body = BytesMut::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(url, e))?;
            if (body.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Err(FetchError::network(
                    url,
                    format!("body exceeds {} bytes", self.max_body_bytes),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body.freeze())
    }
}
