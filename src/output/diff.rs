// src/output/diff.rs
//! Markdown summary for the `diff` command

use crate::delta::RunDelta;

pub fn render_diff(delta: &RunDelta) -> String {
    let mut output = String::from("# ReconPilot Diff\n\n");

    output.push_str(&format!("**New hosts:** {}\n", delta.new_count));
    for host in &delta.new_hosts {
        output.push_str(&format!("- `{}`\n", host));
    }
    output.push('\n');

    output.push_str(&format!("**Removed hosts:** {}\n", delta.removed_count));
    for host in &delta.removed_hosts {
        output.push_str(&format!("- `{}`\n", host));
    }

    output
}
