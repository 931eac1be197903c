use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of a crt.sh JSON search response.
///
/// `name_value` and `common_name` are free text; either may hold several
/// hostnames separated by newlines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrtShRow {
    #[serde(default)]
    pub name_value: Option<String>,
    #[serde(default)]
    pub common_name: Option<String>,
}

impl CrtShRow {
    /// Candidate hostnames in this row, trimmed and lowercased
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        [self.name_value.as_deref(), self.common_name.as_deref()]
            .into_iter()
            .flatten()
            .flat_map(str::lines)
            .map(|line| line.trim().to_lowercase())
            .filter(|name| !name.is_empty())
    }
}

/// Collect unique hostnames from CT rows for `domain`.
///
/// Wildcard entries and the queried base domain itself are dropped; the
/// result is sorted.
pub fn extract_hosts(rows: &[CrtShRow], domain: &str) -> Vec<String> {
    let base = domain.trim().trim_end_matches('.').to_lowercase();

    let names: BTreeSet<String> = rows
        .iter()
        .flat_map(CrtShRow::names)
        .map(|name| name.trim_end_matches('.').to_string())
        .filter(|name| !name.is_empty() && *name != base && !name.starts_with("*."))
        .collect();

    names.into_iter().collect()
}
