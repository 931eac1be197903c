// src/dns.rs
//! Per-host DNS record collection

use crate::types::{DnsRecords, HostRecord, RecordKind};
use anyhow::Result;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Anything that can answer record lookups for a host
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Values of one record type for `host`.
    ///
    /// `Ok(vec![])` and `Err(_)` are both treated as "no records" by callers.
    async fn lookup(&self, host: &str, kind: RecordKind) -> Result<Vec<String>>;
}

/// Query every record type for `host`, in order.
///
/// Types with no answers or a failed lookup are left out. Values are sorted.
pub async fn query_host(source: &dyn RecordSource, host: &str) -> HostRecord {
    let mut records = DnsRecords::new();

    for kind in RecordKind::ALL {
        match source.lookup(host, kind).await {
            Ok(mut values) if !values.is_empty() => {
                values.sort();
                records.insert(kind, values);
            }
            Ok(_) => {}
            Err(e) => {
                debug!("{} lookup for {} failed: {}", kind, host, e);
            }
        }
    }

    HostRecord::new(host, records)
}

/// Record source backed by hickory's async resolver
pub struct HickorySource {
    resolver: TokioAsyncResolver,
}

impl HickorySource {
    /// Resolver using `nameservers` over UDP/TCP port 53, or the system
    /// configuration when the list is empty.
    pub fn new(nameservers: &[IpAddr], timeout: Duration) -> Result<Self> {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;

        let resolver = if nameservers.is_empty() {
            let (config, mut system_opts) = hickory_resolver::system_conf::read_system_conf()?;
            system_opts.timeout = timeout;
            system_opts.attempts = 1;
            TokioAsyncResolver::tokio(config, system_opts)
        } else {
            let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
            let config = ResolverConfig::from_parts(None, vec![], group);
            TokioAsyncResolver::tokio(config, opts)
        };

        Ok(Self { resolver })
    }
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Aaaa => RecordType::AAAA,
        RecordKind::Cname => RecordType::CNAME,
        RecordKind::Mx => RecordType::MX,
        RecordKind::Txt => RecordType::TXT,
        RecordKind::Ns => RecordType::NS,
    }
}

/// Text form of an answer, as stored in the artifacts
fn rdata_to_string(rdata: &RData) -> String {
    match rdata {
        RData::A(a) => a.to_string(),
        RData::AAAA(aaaa) => aaaa.to_string(),
        RData::CNAME(name) => name.to_string(),
        RData::NS(name) => name.to_string(),
        RData::MX(mx) => format!("{} {}", mx.preference(), mx.exchange()),
        RData::TXT(txt) => txt
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect::<Vec<_>>()
            .join(""),
        other => other.to_string(),
    }
}

#[async_trait]
impl RecordSource for HickorySource {
    async fn lookup(&self, host: &str, kind: RecordKind) -> Result<Vec<String>> {
        let wanted = record_type(kind);
        let lookup = self.resolver.lookup(host, wanted).await?;

        // The answer may carry the CNAME chain; keep only the requested type
        let values = lookup
            .iter()
            .filter(|rdata| rdata.record_type() == wanted)
            .map(rdata_to_string)
            .collect();

        Ok(values)
    }
}
