// src/findings.rs
//! Heuristic findings over the assembled host inventory

use crate::filter::ScopeFilter;
use crate::rules::{self, HeuristicsConfig, RuleSet};
use crate::types::{DnsIssue, Finding, HostRecord, RecordKind};
use std::collections::BTreeMap;

pub const DANGLING_CNAME_ISSUE: &str = "dangling_cname_potential";

/// Immediate parent of a host: everything after the first label.
/// A host with no dot is its own parent.
pub fn parent_domain(host: &str) -> &str {
    host.split_once('.').map(|(_, rest)| rest).unwrap_or(host)
}

/// Count hosts per immediate parent domain
pub fn count_by_parent<'a, I>(hosts: I) -> BTreeMap<&'a str, usize>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts = BTreeMap::new();
    for host in hosts {
        *counts.entry(parent_domain(host)).or_insert(0) += 1;
    }
    counts
}

/// Root domains whose direct subdomain count reaches `threshold`
pub fn wildcard_exposure_hint<'a, I>(
    hosts: I,
    scope: &ScopeFilter,
    threshold: usize,
    rules: &RuleSet,
) -> Vec<Finding>
where
    I: IntoIterator<Item = &'a String>,
{
    count_by_parent(hosts)
        .into_iter()
        .filter(|(parent, count)| *count >= threshold && scope.is_root(parent))
        .map(|(root, count)| {
            let rule = rules.rule(rules::WILDCARD_CERT);
            Finding {
                title: "Potential Wildcard Exposure".to_string(),
                asset: root.to_string(),
                why: rule.why,
                evidence: format!("{} subdomains observed in CT for {}", count, root),
                next_steps: rule.next_steps,
            }
        })
        .collect()
}

/// CNAME values of `record` pointing into one of `suffixes`
pub fn cloud_cnames(record: &HostRecord, suffixes: &[String]) -> Vec<String> {
    record
        .values(RecordKind::Cname)
        .iter()
        .filter(|value| {
            let value = value.to_lowercase();
            suffixes.iter().any(|s| value.contains(s.as_str()))
        })
        .cloned()
        .collect()
}

/// Hosts aliased to abandonable cloud endpoints
pub fn dangling_cname_issues(inventory: &[HostRecord], suffixes: &[String]) -> Vec<DnsIssue> {
    inventory
        .iter()
        .filter_map(|record| {
            let evidence = cloud_cnames(record, suffixes);
            (!evidence.is_empty()).then(|| DnsIssue {
                host: record.host.clone(),
                kind: DANGLING_CNAME_ISSUE.to_string(),
                evidence,
            })
        })
        .collect()
}

/// One finding per dangling-CNAME issue
pub fn dangling_cname_hint(issues: &[DnsIssue], rules: &RuleSet) -> Vec<Finding> {
    issues
        .iter()
        .map(|issue| {
            let rule = rules.rule(rules::DANGLING_CNAME);
            Finding {
                title: "Potential Dangling CNAME".to_string(),
                asset: issue.host.clone(),
                why: rule.why,
                evidence: issue.evidence.join(", "),
                next_steps: rule.next_steps,
            }
        })
        .collect()
}

/// Output of both heuristics for one run
#[derive(Debug, Clone, Default)]
pub struct Assessment {
    pub issues: Vec<DnsIssue>,
    pub findings: Vec<Finding>,
}

/// Run both heuristics. Wildcard findings come first.
pub fn assess(
    hosts: &[String],
    inventory: &[HostRecord],
    scope: &ScopeFilter,
    rules: &RuleSet,
) -> Assessment {
    let HeuristicsConfig {
        wildcard_threshold,
        cloud_suffixes,
    } = &rules.heuristics;

    let issues = dangling_cname_issues(inventory, cloud_suffixes);

    let mut findings = wildcard_exposure_hint(hosts, scope, *wildcard_threshold, rules);
    findings.extend(dangling_cname_hint(&issues, rules));

    Assessment { issues, findings }
}
