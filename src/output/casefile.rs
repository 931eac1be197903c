// src/output/casefile.rs
//! Markdown casefile

use super::ReportContext;

/// Escape characters that would break a Markdown table cell
fn table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn push_host_list(output: &mut String, hosts: &[String]) {
    if hosts.is_empty() {
        output.push_str("_none_\n");
    } else {
        for host in hosts {
            output.push_str(&format!("- `{}`\n", host));
        }
    }
}

/// Render the run's Markdown casefile
pub fn render_casefile(ctx: &ReportContext) -> String {
    let mut output = String::new();

    output.push_str(&format!("# ReconPilot Casefile: {}\n\n", ctx.org));
    output.push_str(&format!(
        "_Run `{}` generated {}_\n\n",
        ctx.run_id,
        ctx.run_time.format("%Y-%m-%dT%H:%M:%SZ")
    ));

    // Scope
    output.push_str("## Scope\n\n");
    for domain in &ctx.scope_domains {
        output.push_str(&format!("- `{}`\n", domain));
    }
    if ctx.scope_domains.is_empty() {
        output.push_str("_No domains configured._\n");
    }
    output.push('\n');
    let policy = if ctx.passive_only { "passive only" } else { "passive (active allowed by policy)" };
    output.push_str(&format!("**Policy:** {}\n\n", policy));
    if !ctx.notes.trim().is_empty() {
        output.push_str(&format!("**Notes:** {}\n\n", ctx.notes.trim()));
    }

    // Summary
    output.push_str("## Summary\n\n");
    output.push_str("| Metric | Value |\n|---|---|\n");
    output.push_str(&format!("| Total subdomains | {} |\n", ctx.stats.total_subdomains));
    output.push_str(&format!("| New since previous run | {} |\n", ctx.stats.new_subdomains));
    output.push_str(&format!("| Removed since previous run | {} |\n", ctx.stats.removed_subdomains));
    output.push_str(&format!("| DNS issues | {} |\n", ctx.stats.dns_issues));
    output.push_str(&format!("| Findings | {} |\n\n", ctx.findings.len()));

    // Delta
    output.push_str("## Changes Since Previous Run\n\n");
    match &ctx.delta.previous_run {
        None => output.push_str("First run: there is no previous run to compare against.\n\n"),
        Some(previous) => {
            output.push_str(&format!("Compared against `{}`.\n\n", previous));
            output.push_str(&format!("### New hosts ({})\n\n", ctx.delta.new_count));
            push_host_list(&mut output, &ctx.delta.new_hosts);
            output.push('\n');
            output.push_str(&format!("### Removed hosts ({})\n\n", ctx.delta.removed_count));
            push_host_list(&mut output, &ctx.delta.removed_hosts);
            output.push('\n');
        }
    }

    // Findings
    output.push_str("## Findings\n\n");
    if ctx.findings.is_empty() {
        output.push_str("No findings for this run.\n\n");
    }
    for (i, finding) in ctx.findings.iter().enumerate() {
        output.push_str(&format!("### {}. {} (`{}`)\n\n", i + 1, finding.title, finding.asset));
        if !finding.why.trim().is_empty() {
            output.push_str(&format!("**Why it matters:** {}\n\n", finding.why.trim()));
        }
        output.push_str(&format!("**Evidence:** `{}`\n\n", finding.evidence));
        if !finding.next_steps.is_empty() {
            output.push_str("**Next steps:**\n\n");
            for step in &finding.next_steps {
                output.push_str(&format!("- {}\n", step));
            }
            output.push('\n');
        }
    }

    // DNS issues
    if !ctx.dns_issues.is_empty() {
        output.push_str("## DNS Issues\n\n");
        output.push_str("| Host | Type | Evidence |\n|---|---|---|\n");
        for issue in &ctx.dns_issues {
            output.push_str(&format!(
                "| `{}` | {} | {} |\n",
                table_cell(&issue.host),
                table_cell(&issue.kind),
                table_cell(&issue.evidence.join(", "))
            ));
        }
        output.push('\n');
    }

    // Inventory
    output.push_str("## Inventory\n\n");
    if ctx.inventory.is_empty() {
        output.push_str("No in-scope hosts discovered.\n");
    } else {
        output.push_str("| Host | Records |\n|---|---|\n");
        for line in &ctx.inventory {
            output.push_str(&format!(
                "| `{}` | {} |\n",
                table_cell(&line.host),
                table_cell(&line.records_summary)
            ));
        }
    }

    output
}
