// src/stats.rs
//! Summary figures for a completed run

use crate::delta::RunDelta;
use crate::types::HostRecord;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total_subdomains: usize,
    pub new_subdomains: usize,
    pub removed_subdomains: usize,
    pub dns_issues: usize,
    pub findings: usize,
}

impl RunStats {
    pub fn new(total_subdomains: usize, delta: &RunDelta, dns_issues: usize, findings: usize) -> Self {
        Self {
            total_subdomains,
            new_subdomains: delta.new_count,
            removed_subdomains: delta.removed_count,
            dns_issues,
            findings,
        }
    }
}

/// One inventory line for the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLine {
    pub host: String,
    pub records_summary: String,
}

pub fn inventory_summary(inventory: &[HostRecord]) -> Vec<InventoryLine> {
    inventory
        .iter()
        .map(|record| InventoryLine {
            host: record.host.clone(),
            records_summary: record.records_summary(),
        })
        .collect()
}

/// Wall-clock timer for the console summary
pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    /// Format elapsed duration
    pub fn format_elapsed(secs: u64) -> String {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
