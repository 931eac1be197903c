// src/output/mod.rs
//! Console narration and report rendering
//!
//! The casefile is rendered to Markdown first; the HTML report wraps the
//! converted Markdown in a standalone styled page.

use crate::delta::RunDelta;
use crate::stats::{InventoryLine, RunStats};
use crate::types::{DnsIssue, Finding};
use chrono::{DateTime, Utc};

pub mod casefile;
pub mod console;
pub mod diff;
pub mod html;

pub use casefile::render_casefile;
pub use console::Console;
pub use diff::render_diff;
pub use html::render_casefile_html;

/// Everything the casefile shows about one run
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub org: String,
    pub run_id: String,
    pub run_time: DateTime<Utc>,
    pub scope_domains: Vec<String>,
    pub passive_only: bool,
    pub notes: String,
    pub stats: RunStats,
    pub delta: RunDelta,
    pub findings: Vec<Finding>,
    pub dns_issues: Vec<DnsIssue>,
    pub inventory: Vec<InventoryLine>,
}
