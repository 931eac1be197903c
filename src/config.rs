// src/config.rs

use crate::filter::{normalize_host, ScopeFilter};
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Policy {
    #[serde(default = "default_passive_only")]
    pub passive_only: bool,
}

fn default_passive_only() -> bool { true }

impl Default for Policy {
    fn default() -> Self {
        Self {
            passive_only: default_passive_only(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Seeds {
    #[serde(default)]
    pub hosts: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_ct_url")]
    pub ct_url: String,
    #[serde(default = "default_ct_delay_ms")]
    pub ct_delay_ms: u64,  // Politeness pause after every CT request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_dns_timeout_secs")]
    pub dns_timeout_secs: u64,
}

fn default_ct_url() -> String { "https://crt.sh/".to_string() }
fn default_ct_delay_ms() -> u64 { 1000 }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_dns_timeout_secs() -> u64 { 5 }
fn default_resolvers() -> Vec<String> {
    vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()]
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ct_url: default_ct_url(),
            ct_delay_ms: default_ct_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            dns_timeout_secs: default_dns_timeout_secs(),
        }
    }
}

impl SourcesConfig {
    pub fn ct_delay(&self) -> Duration {
        Duration::from_millis(self.ct_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

/// Dot-separated labels of `[a-z0-9-]`, no label empty or edged with '-'.
/// Expects input already passed through `normalize_host`.
fn is_domain_name(domain: &str) -> bool {
    domain.len() <= 253
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        })
}

/// Organization scope for a recon run. Immutable once loaded.
#[derive(Debug, Deserialize, Clone)]
pub struct Scope {
    pub org: String,
    pub domains: Vec<String>,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_resolvers")]
    pub resolvers: Vec<String>,
    #[serde(default)]
    pub seeds: Seeds,
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Scope {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scope file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid scope file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let scope: Scope = toml::from_str(contents)?;
        scope.validated()
    }

    /// Normalize domains and check required fields.
    fn validated(mut self) -> anyhow::Result<Self> {
        self.org = self.org.trim().to_string();
        if self.org.is_empty() {
            anyhow::bail!("`org` must not be empty");
        }

        let mut domains = Vec::with_capacity(self.domains.len());
        for raw in &self.domains {
            let domain = normalize_host(raw);
            if domain.is_empty() {
                anyhow::bail!("`domains` contains an empty entry");
            }
            if !is_domain_name(&domain) {
                anyhow::bail!("Domain '{}' is not a valid hostname", raw.trim());
            }
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
        self.domains = domains;

        for resolver in &self.resolvers {
            resolver
                .trim()
                .parse::<IpAddr>()
                .with_context(|| format!("Resolver '{}' is not an IP address", resolver))?;
        }

        if self.sources.ct_url.trim().is_empty() {
            anyhow::bail!("`sources.ct_url` must not be empty");
        }

        Ok(self)
    }

    /// Build the scope matcher for this organization
    pub fn filter(&self) -> ScopeFilter {
        ScopeFilter::from_list(&self.domains)
    }

    /// Resolver addresses, already validated at load time
    pub fn resolver_ips(&self) -> Vec<IpAddr> {
        self.resolvers
            .iter()
            .filter_map(|r| r.trim().parse().ok())
            .collect()
    }
}
