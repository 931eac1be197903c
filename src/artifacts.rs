// src/artifacts.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const RUN_PREFIX: &str = "run-";
pub const ARTIFACTS_DIR: &str = "artifacts";
pub const INVENTORY_FILE: &str = "inventory_hosts.json";
pub const SEED_HOSTS_FILE: &str = "seed_hosts.json";
pub const DNS_RECORDS_FILE: &str = "dns_records.json";
pub const DNS_ISSUES_FILE: &str = "dns_issues.json";
pub const FINDINGS_FILE: &str = "findings.json";
pub const DELTA_FILE: &str = "delta.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const CASEFILE_MD: &str = "casefile.md";
pub const CASEFILE_HTML: &str = "casefile.html";

/// Run directory name for a UTC timestamp and optional tag
pub fn run_name(at: DateTime<Utc>, tag: Option<&str>) -> String {
    let stamp = at.format("%Y%m%d-%H%M%SZ");
    match tag.filter(|t| !t.is_empty()) {
        Some(tag) => format!("{}{}-{}", RUN_PREFIX, stamp, tag),
        None => format!("{}{}", RUN_PREFIX, stamp),
    }
}

/// File name for one domain's CT results
pub fn ct_file(domain: &str) -> String {
    format!("ct_{}.json", domain)
}

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// A run being built in a staging directory.
///
/// Artifacts are written under `<out_dir>/.<name>.partial/` and the directory
/// only becomes `<out_dir>/<name>/` on [`RunDir::commit`]. Dropping an
/// uncommitted run removes the staging directory, so a failed run never
/// shows up as a `run-*` directory.
pub struct RunDir {
    root: PathBuf,
    staging: PathBuf,
    artifacts: PathBuf,
    written: BTreeMap<String, String>, // artifact file name -> sha256
    committed: bool,
}

/// Staging directory name for a run in progress
pub fn staging_name(name: &str) -> String {
    format!(".{}.partial", name)
}

impl RunDir {
    /// Start a run in staging. Fails if `<out_dir>/<name>` already exists.
    pub fn create(out_dir: &Path, name: &str) -> Result<Self> {
        let root = out_dir.join(name);
        if root.exists() {
            anyhow::bail!("Run directory {} already exists", root.display());
        }

        let staging = out_dir.join(staging_name(name));
        if staging.exists() {
            debug!("Removing stale staging directory {:?}", staging);
            fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to remove stale {}", staging.display()))?;
        }

        let artifacts = staging.join(ARTIFACTS_DIR);
        fs::create_dir_all(&artifacts)
            .with_context(|| format!("Failed to create {}", artifacts.display()))?;

        debug!("Staging run in {:?}", staging);

        Ok(Self {
            root,
            staging,
            artifacts,
            written: BTreeMap::new(),
            committed: false,
        })
    }

    /// Artifacts directory inside the staging area
    pub fn artifacts_path(&self) -> &Path {
        &self.artifacts
    }

    /// Serialize `value` as pretty JSON into the artifacts directory
    pub fn write_artifact<T: Serialize + ?Sized>(&mut self, file_name: &str, value: &T) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize {}", file_name))?;
        json.push(b'\n');

        write_atomic(&self.artifacts.join(file_name), &json)?;
        self.written.insert(file_name.to_string(), sha256_hex(&json));

        Ok(())
    }

    /// Write a report file at the run root
    pub fn write_report(&self, file_name: &str, contents: &str) -> Result<()> {
        write_atomic(&self.staging.join(file_name), contents.as_bytes())
    }

    /// Write `manifest.json` with the digest of every artifact written so far
    pub fn write_manifest(&mut self) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(&self.written)?;
        json.push(b'\n');
        write_atomic(&self.artifacts.join(MANIFEST_FILE), &json)
    }

    /// Move the finished run into place and return its final path
    pub fn commit(&mut self) -> Result<PathBuf> {
        if self.root.exists() {
            anyhow::bail!("Run directory {} already exists", self.root.display());
        }

        fs::rename(&self.staging, &self.root).with_context(|| {
            format!(
                "Failed to move {} to {}",
                self.staging.display(),
                self.root.display()
            )
        })?;
        self.committed = true;

        Ok(self.root.clone())
    }
}

impl Drop for RunDir {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.staging) {
            warn!("Failed to remove unfinished run {}: {}", self.staging.display(), e);
        } else {
            debug!("Removed unfinished run {:?}", self.staging);
        }
    }
}

/// Write to a temporary file first, then rename into place
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename {} into place", temp_path.display()))?;

    Ok(())
}
