// src/rules.rs
//! Finding explanations and heuristic parameters

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Rules shipped with the binary, used when no rules file is given
pub const DEFAULT_RULES: &str = include_str!("../rules/recon_rules.toml");

pub const WILDCARD_CERT: &str = "wildcard_cert";
pub const DANGLING_CNAME: &str = "dangling_cname";

/// Explanation attached to every finding of one kind
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Rule {
    pub why: String,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeuristicsConfig {
    #[serde(default = "default_wildcard_threshold")]
    pub wildcard_threshold: usize,
    #[serde(default = "default_cloud_suffixes")]
    pub cloud_suffixes: Vec<String>,
}

fn default_wildcard_threshold() -> usize { 30 }
fn default_cloud_suffixes() -> Vec<String> {
    ["amazonaws.com", "github.io", "herokuapp.com", "azurewebsites.net"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            wildcard_threshold: default_wildcard_threshold(),
            cloud_suffixes: default_cloud_suffixes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RuleSet {
    #[serde(default)]
    pub findings: BTreeMap<String, Rule>,
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
}

impl RuleSet {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid rules file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let mut rules: RuleSet = toml::from_str(contents)?;

        if rules.heuristics.wildcard_threshold == 0 {
            anyhow::bail!("`heuristics.wildcard_threshold` must be greater than 0");
        }

        rules.heuristics.cloud_suffixes = rules
            .heuristics
            .cloud_suffixes
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(rules)
    }

    /// The embedded rule set
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_toml(DEFAULT_RULES).context("Embedded rules are invalid")
    }

    /// Load from `path` if given, else the embedded rules
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }

    /// Rule for a finding kind; a missing kind gets an empty explanation
    pub fn rule(&self, kind: &str) -> Rule {
        match self.findings.get(kind) {
            Some(rule) => rule.clone(),
            None => {
                tracing::warn!("No rule defined for finding kind '{}'", kind);
                Rule::default()
            }
        }
    }
}
