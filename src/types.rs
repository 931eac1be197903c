// src/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// DNS record types collected for every host, in query order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
    #[serde(rename = "CNAME")]
    Cname,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "TXT")]
    Txt,
    #[serde(rename = "NS")]
    Ns,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::A,
        RecordKind::Aaaa,
        RecordKind::Cname,
        RecordKind::Mx,
        RecordKind::Txt,
        RecordKind::Ns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Cname => "CNAME",
            RecordKind::Mx => "MX",
            RecordKind::Txt => "TXT",
            RecordKind::Ns => "NS",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record values per type. Types with no answers are absent.
pub type DnsRecords = BTreeMap<RecordKind, Vec<String>>;

/// A discovered host and its DNS answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub host: String,
    pub records: DnsRecords,
}

impl HostRecord {
    pub fn new(host: impl Into<String>, records: DnsRecords) -> Self {
        Self {
            host: host.into(),
            records,
        }
    }

    /// Values for one record type (empty when none were returned)
    pub fn values(&self, kind: RecordKind) -> &[String] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Counts per present record type in query order, e.g. "A:2, CNAME:1"
    pub fn records_summary(&self) -> String {
        let bits: Vec<String> = RecordKind::ALL
            .iter()
            .filter_map(|kind| {
                let values = self.values(*kind);
                (!values.is_empty()).then(|| format!("{}:{}", kind, values.len()))
            })
            .collect();

        if bits.is_empty() {
            "(no records)".to_string()
        } else {
            bits.join(", ")
        }
    }
}

/// A DNS configuration that looks risky
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsIssue {
    pub host: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub evidence: Vec<String>,
}

/// Heuristic result with its explanation, rendered into the casefile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub asset: String,
    pub why: String,
    pub evidence: String,
    pub next_steps: Vec<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[!] {}: {}", self.title, self.asset)
    }
}
