// src/delta.rs
//! Host set differences between successive runs

use crate::artifacts::{INVENTORY_FILE, RUN_PREFIX};
use crate::filter::normalize_host;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Difference between the current run and the one before it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDelta {
    /// Name of the previous run directory, `None` on a first run
    pub previous_run: Option<String>,
    pub new_count: usize,
    pub removed_count: usize,
    pub new_hosts: Vec<String>,
    pub removed_hosts: Vec<String>,
}

impl RunDelta {
    /// Delta for a run with nothing to compare against
    pub fn first_run() -> Self {
        Self::default()
    }

    /// `new = current - previous`, `removed = previous - current`
    pub fn between(
        previous_run: Option<String>,
        previous: &BTreeSet<String>,
        current: &BTreeSet<String>,
    ) -> Self {
        let new_hosts: Vec<String> = current.difference(previous).cloned().collect();
        let removed_hosts: Vec<String> = previous.difference(current).cloned().collect();

        Self {
            previous_run,
            new_count: new_hosts.len(),
            removed_count: removed_hosts.len(),
            new_hosts,
            removed_hosts,
        }
    }

    pub fn is_first_run(&self) -> bool {
        self.previous_run.is_none()
    }
}

/// Run directory names in `out_dir`, sorted
pub fn list_runs(out_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(out_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list runs in {}: {}", out_dir.display(), e);
            return Vec::new();
        }
    };

    let mut runs: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(RUN_PREFIX))
        .collect();

    runs.sort();
    runs
}

/// The run sorting immediately before `current_run` in `out_dir`
pub fn previous_run(out_dir: &Path, current_run: &str) -> Option<String> {
    list_runs(out_dir)
        .into_iter()
        .filter(|name| name.as_str() < current_run)
        .next_back()
}

/// Host list from an inventory JSON value.
///
/// Accepts a bare list or an object carrying the list under `hosts`.
/// Returns `None` for any other shape.
pub fn hosts_from_value(value: &Value) -> Option<BTreeSet<String>> {
    let list = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.get("hosts")?.as_array()?,
        _ => return None,
    };

    let hosts = list
        .iter()
        .filter_map(Value::as_str)
        .map(normalize_host)
        .filter(|h| !h.is_empty())
        .collect();

    Some(hosts)
}

/// Strictly read a run's inventory; used where a missing file is an error
pub fn read_inventory(run_dir: &Path) -> Result<BTreeSet<String>> {
    let path = inventory_path(run_dir);
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read inventory {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Inventory {} is not valid JSON", path.display()))?;

    hosts_from_value(&value).with_context(|| {
        format!(
            "Inventory {} is neither a host list nor an object with `hosts`",
            path.display()
        )
    })
}

/// Read a run's inventory, falling back to an empty set on any problem
pub fn load_inventory_lenient(run_dir: &Path) -> BTreeSet<String> {
    match read_inventory(run_dir) {
        Ok(hosts) => hosts,
        Err(e) => {
            warn!("Treating previous inventory as empty: {:#}", e);
            BTreeSet::new()
        }
    }
}

pub fn inventory_path(run_dir: &Path) -> PathBuf {
    run_dir.join(crate::artifacts::ARTIFACTS_DIR).join(INVENTORY_FILE)
}

/// Compare `current_hosts` against the run preceding `current_run` in `out_dir`
pub fn compute_delta(out_dir: &Path, current_run: &str, current_hosts: &BTreeSet<String>) -> RunDelta {
    let Some(previous) = previous_run(out_dir, current_run) else {
        debug!("No run before {} in {}", current_run, out_dir.display());
        return RunDelta::first_run();
    };

    let previous_hosts = load_inventory_lenient(&out_dir.join(&previous));
    RunDelta::between(Some(previous), &previous_hosts, current_hosts)
}
