//! Production fetcher: reqwest with per-domain serialization and a global
//! in-flight cap.
//!
//! At most one request is in flight per domain, with a minimum delay between
//! consecutive requests to the same domain. A semaphore bounds total
//! concurrency across all companies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use url::Url;

use crate::config::CrawlConfig;
use crate::traits::PageFetcher;
use crate::types::FetchedPage;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-domain gate: holding the lock serializes requests, the instant inside
/// is when the previous request finished.
type DomainGate = Arc<AsyncMutex<Option<Instant>>>;

pub struct HttpFetcher {
    client: reqwest::Client,
    global: Arc<Semaphore>,
    domains: Mutex<HashMap<String, DomainGate>>,
    per_domain_delay: std::time::Duration,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.fetch_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            global: Arc::new(Semaphore::new(config.max_in_flight_requests)),
            domains: Mutex::new(HashMap::new()),
            per_domain_delay: config.per_domain_delay,
        })
    }

    fn gate_for(&self, url: &str) -> DomainGate {
        let domain = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());

        let mut domains = self.domains.lock().expect("domain registry poisoned");
        domains.entry(domain).or_default().clone()
    }

    /// Wait for the domain's turn, then run `send` under the global permit.
    async fn with_discipline<T, F, Fut>(&self, url: &str, send: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let gate = self.gate_for(url);
        let mut last_done = gate.lock().await;

        if let Some(done_at) = *last_done {
            let elapsed = done_at.elapsed();
            if elapsed < self.per_domain_delay {
                tokio::time::sleep(self.per_domain_delay - elapsed).await;
            }
        }

        // Semaphore is never closed, acquire cannot fail.
        let _permit = self
            .global
            .acquire()
            .await
            .expect("global request semaphore closed");
        let out = send().await;
        *last_done = Some(Instant::now());
        out
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .with_discipline(url, || self.client.get(url).send())
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read body from {}", url))?;

        tracing::debug!(url, status, bytes = body.len(), "page fetched");
        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }

    async fn probe(&self, url: &str) -> bool {
        let result = self
            .with_discipline(url, || self.client.head(url).send())
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(url, error = %err, "probe failed");
                false
            }
        }
    }
}
