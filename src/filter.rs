// src/filter.rs
//! Scope matching for discovered hostnames

use std::collections::BTreeSet;

/// Normalize a hostname for comparison and deduplication.
///
/// Trims surrounding whitespace, lowercases, and strips trailing dots.
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_lowercase()
}

/// Check whether `host` equals one of `domains` or is a strict subdomain of one.
///
/// Both sides are normalized before comparison. An empty domain list matches nothing.
pub fn in_scope<S: AsRef<str>>(host: &str, domains: &[S]) -> bool {
    let host = normalize_host(host);
    if host.is_empty() {
        return false;
    }

    domains.iter().any(|d| {
        let root = normalize_host(d.as_ref());
        !root.is_empty() && matches_root(&host, &root)
    })
}

fn matches_root(host: &str, root: &str) -> bool {
    // Exact match
    if host == root {
        return true;
    }

    // Subdomain match: "x.root" but never "xroot"
    host.strip_suffix(root)
        .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Filter holding the organization's root domains
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    roots: Vec<String>,
}

impl ScopeFilter {
    /// Create a filter from a list of root domains
    pub fn from_list<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roots: Vec<String> = Vec::new();
        for d in domains {
            let root = normalize_host(d.as_ref());
            if !root.is_empty() && !roots.contains(&root) {
                roots.push(root);
            }
        }

        Self { roots }
    }

    /// Check if a host belongs to the scope (exact root or subdomain)
    pub fn is_in_scope(&self, host: &str) -> bool {
        let host = normalize_host(host);
        !host.is_empty() && self.roots.iter().any(|root| matches_root(&host, root))
    }

    /// Normalize, deduplicate and keep only in-scope hosts
    pub fn retain_in_scope<I, S>(&self, hosts: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        hosts
            .into_iter()
            .map(|h| normalize_host(h.as_ref()))
            .filter(|h| self.is_in_scope(h))
            .collect()
    }

    /// Whether `domain` is one of the configured roots
    pub fn is_root(&self, domain: &str) -> bool {
        let domain = normalize_host(domain);
        self.roots.iter().any(|r| *r == domain)
    }

    /// Get the number of root domains in the filter
    pub fn count(&self) -> usize {
        self.roots.len()
    }
}
