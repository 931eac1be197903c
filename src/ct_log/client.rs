// src/ct_log/client.rs
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::types::{extract_hosts, CrtShRow};
use crate::config::SourcesConfig;

/// HTTP client for the crt.sh certificate search API
pub struct CtClient {
    base_url: Url,
    http_client: reqwest::Client,
    delay: Duration,
}

impl CtClient {
    /// Create a new CT search client
    pub fn new(base_url: &str, timeout: Duration, delay: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid CT search URL '{}'", base_url))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("recon-pilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            http_client,
            delay,
        })
    }

    pub fn from_config(sources: &SourcesConfig) -> Result<Self> {
        Self::new(&sources.ct_url, sources.request_timeout(), sources.ct_delay())
    }

    /// Search URL for every certificate under `domain`
    /// Endpoint: GET {base_url}?q=%.{domain}&output=json
    pub fn search_url(&self, domain: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("%.{}", domain))
            .append_pair("output", "json");
        url
    }

    /// Fetch the raw CT rows for a domain
    pub async fn get_rows(&self, domain: &str) -> Result<Vec<CrtShRow>> {
        let url = self.search_url(domain);

        debug!("Fetching CT rows from {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to fetch CT rows")?;

        if !response.status().is_success() {
            anyhow::bail!("CT search for {} failed with status {}", domain, response.status());
        }

        let rows: Vec<CrtShRow> = response
            .json()
            .await
            .context("Failed to parse CT search JSON")?;

        debug!("Received {} CT rows for {}", rows.len(), domain);

        Ok(rows)
    }

    /// Fetch unique hostnames seen in CT for `domain`.
    ///
    /// Any failure counts as zero results. The politeness delay is applied
    /// after every request.
    pub async fn fetch_hosts(&self, domain: &str) -> Vec<String> {
        let hosts = match self.get_rows(domain).await {
            Ok(rows) => extract_hosts(&rows, domain),
            Err(e) => {
                warn!("CT lookup for {} returned no results: {:#}", domain, e);
                Vec::new()
            }
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        hosts
    }
}
