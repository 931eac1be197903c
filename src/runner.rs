// src/runner.rs
//! The `run` and `diff` pipelines

use crate::artifacts::{self, RunDir};
use crate::config::Scope;
use crate::ct_log::CtClient;
use crate::delta::{self, RunDelta};
use crate::dns::{self, RecordSource};
use crate::findings::{self, Assessment};
use crate::output::{self, Console, ReportContext};
use crate::progress::ProgressIndicator;
use crate::rules::RuleSet;
use crate::stats::{self, RunStats, RunTimer};
use crate::types::{Finding, HostRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings for one `run` invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub out_dir: PathBuf,
    pub tag: Option<String>,
    pub started_at: DateTime<Utc>,
    pub write_html: bool,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            tag: None,
            started_at: Utc::now(),
            write_html: true,
            show_progress: false,
        }
    }

    pub fn run_name(&self) -> String {
        artifacts::run_name(self.started_at, self.tag.as_deref())
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_name: String,
    pub run_dir: PathBuf,
    pub hosts: Vec<String>,
    pub inventory: Vec<HostRecord>,
    pub findings: Vec<Finding>,
    pub delta: RunDelta,
    pub stats: RunStats,
    pub casefile_md: PathBuf,
    pub casefile_html: Option<PathBuf>,
}

/// Execute a full passive run against `scope`, strictly one request at a time.
pub async fn run_recon(
    scope: &Scope,
    rules: &RuleSet,
    ct: &CtClient,
    resolver: &dyn RecordSource,
    opts: &RunOptions,
    console: &mut Console,
) -> Result<RunOutcome> {
    let timer = RunTimer::start();
    let filter = scope.filter();

    console.rule("ReconPilot - Passive run")?;
    console.field("Org", &scope.org)?;
    console.field("Domains", &scope.domains.join(", "))?;
    console.blank()?;

    if !scope.policy.passive_only {
        info!("Scope policy allows active work; only passive sources are used");
    }

    let run_name = opts.run_name();
    let mut run = RunDir::create(&opts.out_dir, &run_name)?;
    info!("Starting run {}", run_name);

    let mut all_hosts: BTreeSet<String> = BTreeSet::new();

    // 1) CT discovery
    for base in &scope.domains {
        console.step("ct", &format!("querying certificate transparency for {}...", base))?;
        let found = ct.fetch_hosts(base).await;
        let hosts: Vec<String> = filter.retain_in_scope(&found).into_iter().collect();
        console.detail(&format!("found {} hosts in-scope", hosts.len()))?;
        debug!("{} CT names for {}, {} in scope", found.len(), base, hosts.len());

        run.write_artifact(&artifacts::ct_file(base), &hosts)?;
        all_hosts.extend(hosts);
    }

    // Seed hosts from the scope file
    let seeds = filter.retain_in_scope(&scope.seeds.hosts);
    if !seeds.is_empty() {
        console.step("seeds", &format!("{} seed hosts in-scope", seeds.len()))?;
    }
    run.write_artifact(artifacts::SEED_HOSTS_FILE, &seeds)?;
    all_hosts.extend(seeds);

    let hosts: Vec<String> = all_hosts.iter().cloned().collect();
    run.write_artifact(artifacts::INVENTORY_FILE, &hosts)?;

    // 2) DNS records
    console.step("dns", &format!("resolving {} hosts...", hosts.len()))?;
    console.flush()?;
    let progress = ProgressIndicator::new(opts.show_progress, hosts.len() as u64);
    let mut inventory = Vec::with_capacity(hosts.len());
    for host in &hosts {
        progress.set_message(host.clone());
        inventory.push(dns::query_host(resolver, host).await);
        progress.inc();
    }
    progress.finish();
    run.write_artifact(artifacts::DNS_RECORDS_FILE, &inventory)?;

    // 3) Findings
    let Assessment { issues, findings } = findings::assess(&hosts, &inventory, &filter, rules);
    run.write_artifact(artifacts::DNS_ISSUES_FILE, &issues)?;
    run.write_artifact(artifacts::FINDINGS_FILE, &findings)?;
    for finding in &findings {
        console.finding(&format!("{}: {}", finding.title, finding.asset))?;
    }

    // 4) Delta against the previous run
    let delta = delta::compute_delta(&opts.out_dir, &run_name, &all_hosts);
    run.write_artifact(artifacts::DELTA_FILE, &delta)?;
    match &delta.previous_run {
        Some(previous) => console.step(
            "delta",
            &format!("{} new, {} removed since {}", delta.new_count, delta.removed_count, previous),
        )?,
        None => console.step("delta", "first run, nothing to compare")?,
    }

    // 5) Render casefile
    let stats = RunStats::new(hosts.len(), &delta, issues.len(), findings.len());
    let context = ReportContext {
        org: scope.org.clone(),
        run_id: run_name.clone(),
        run_time: Utc::now(),
        scope_domains: scope.domains.clone(),
        passive_only: scope.policy.passive_only,
        notes: scope.notes.clone(),
        stats: stats.clone(),
        delta: delta.clone(),
        findings: findings.clone(),
        dns_issues: issues,
        inventory: stats::inventory_summary(&inventory),
    };

    run.write_report(artifacts::CASEFILE_MD, &output::render_casefile(&context))?;
    if opts.write_html {
        run.write_report(artifacts::CASEFILE_HTML, &output::render_casefile_html(&context))?;
    }

    run.write_manifest()?;
    let run_dir = run.commit()?;

    let casefile_md = run_dir.join(artifacts::CASEFILE_MD);
    let casefile_html = opts
        .write_html
        .then(|| run_dir.join(artifacts::CASEFILE_HTML));

    console.blank()?;
    console.success(&format!(
        "Wrote artifacts -> {}",
        run_dir.join(artifacts::ARTIFACTS_DIR).display()
    ))?;
    console.success(&format!("Wrote report -> {}", casefile_md.display()))?;
    if let Some(ref path) = casefile_html {
        console.success(&format!("Wrote HTML report -> {}", path.display()))?;
    }
    console.flush()?;

    info!(
        "Run {} finished in {}: {} hosts, {} findings",
        run_name,
        RunTimer::format_elapsed(timer.elapsed_secs()),
        hosts.len(),
        findings.len()
    );

    Ok(RunOutcome {
        run_name,
        run_dir,
        hosts,
        inventory,
        findings,
        delta,
        stats,
        casefile_md,
        casefile_html,
    })
}

/// Compare the inventories of two existing run directories
pub fn diff_runs(older: &Path, newer: &Path) -> Result<RunDelta> {
    for dir in [older, newer] {
        if !dir.is_dir() {
            anyhow::bail!("Run directory {} does not exist", dir.display());
        }
    }

    let previous = delta::read_inventory(older)?;
    let current = delta::read_inventory(newer)?;

    let older_name = older
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| older.display().to_string());

    Ok(RunDelta::between(Some(older_name), &previous, &current))
}

/// `diff` command: write the Markdown summary to `out`
pub fn run_diff(older: &Path, newer: &Path, out: &Path, console: &mut Console) -> Result<RunDelta> {
    let delta = diff_runs(older, newer)?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    artifacts::write_atomic(out, output::render_diff(&delta).as_bytes())?;

    console.success(&format!("Wrote diff -> {}", out.display()))?;
    console.flush()?;

    Ok(delta)
}
