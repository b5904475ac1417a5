//! Concurrent HTTP fetcher for threat-intelligence feeds.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::profiles::FeedSource;
use crate::retry::retry_with_backoff;

const TIMEOUT_SECS: u64 = 30;

/// Total attempts per source before it is dropped from the run.
const MAX_ATTEMPTS: u32 = 5;

/// Maximum concurrent HTTP requests to feed servers.
const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Maximum size per feed payload (10 MB). The largest known feed
/// (blocklist.de all.txt) is well under 1 MB.
const MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;

/// Size cap check, kept in u64 so an advertised length never truncates
/// on 32-bit targets.
fn exceeds_body_cap(len: u64) -> bool {
    len > MAX_BODY_SIZE
}

/// The outcome of polling one feed: the raw payload, or a terminal
/// failure marker once retries are exhausted.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source: &'static FeedSource,
    pub body: Option<String>,
}

impl SourceResult {
    pub fn is_failed(&self) -> bool {
        self.body.is_none()
    }
}

/// HTTP client for polling feed sources.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("firewalld-ext/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Poll every source of a profile concurrently.
    ///
    /// One `SourceResult` is produced per source; a source that keeps
    /// failing is marked failed instead of aborting the batch.
    pub async fn fetch_all(&self, sources: &'static [FeedSource]) -> Vec<SourceResult> {
        stream::iter(sources.iter().map(|source| self.fetch_source(source)))
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await
    }

    /// Fetch a single source with linear backoff between attempts.
    pub async fn fetch_source(&self, source: &'static FeedSource) -> SourceResult {
        info!("Fetching {}...", source.name);

        let outcome = retry_with_backoff(
            MAX_ATTEMPTS,
            |attempt| Duration::from_secs(u64::from(attempt)),
            || self.fetch_once(source),
        )
        .await;

        match outcome {
            Ok(body) => {
                info!("Fetched {} ({} bytes)", source.name, body.len());
                SourceResult {
                    source,
                    body: Some(body),
                }
            }
            Err(e) => {
                error!(
                    "Failed to fetch {} {} times in a row; retries expired: {:#}",
                    source.name, MAX_ATTEMPTS, e
                );
                SourceResult { source, body: None }
            }
        }
    }

    async fn fetch_once(&self, source: &FeedSource) -> Result<String> {
        let response = self
            .client
            .get(source.url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", source.url))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {} from {}", response.status(), source.url);
        }

        if let Some(length) = response.content_length() {
            if exceeds_body_cap(length) {
                anyhow::bail!(
                    "response too large: {} bytes (max: {} bytes)",
                    length,
                    MAX_BODY_SIZE
                );
            }
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if exceeds_body_cap(body.len() as u64) {
            anyhow::bail!(
                "downloaded content too large: {} bytes (max: {} bytes)",
                body.len(),
                MAX_BODY_SIZE
            );
        }

        // An empty body counts as a failed attempt, same as a transport error.
        if body.is_empty() {
            anyhow::bail!("empty response body from {}", source.url);
        }

        Ok(body)
    }
}
