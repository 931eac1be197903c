// src/cli.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ReconPilot: passive-first recon autopilot
///
/// Enumerates an organization's internet-facing hostnames from certificate
/// transparency and DNS, flags risky configurations, and tracks changes
/// between runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "recon-pilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    // ===== Logging =====
    /// Verbose logging (set log level to debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Quiet logging (set log level to warn)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run passive recon against the defined scope
    Run(RunArgs),
    /// Diff two runs to see what's new or removed
    Diff(DiffArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the scope TOML file
    #[arg(short = 's', long = "scope")]
    pub scope: PathBuf,

    /// Output directory holding run folders
    #[arg(short = 'o', long = "out", default_value = "runs")]
    pub out: PathBuf,

    /// Optional run tag, appended to the run folder name
    #[arg(short = 't', long = "tag")]
    pub tag: Option<String>,

    /// Rules TOML file (defaults to the built-in rules)
    #[arg(short = 'r', long = "rules")]
    pub rules: Option<PathBuf>,

    /// Skip the HTML casefile
    #[arg(long = "no-html")]
    pub no_html: bool,

    /// Disable the DNS progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Path to the older run directory
    #[arg(short = 'a', long = "a")]
    pub older: PathBuf,

    /// Path to the newer run directory
    #[arg(short = 'b', long = "b")]
    pub newer: PathBuf,

    /// Output Markdown path
    #[arg(short = 'o', long = "out", default_value = "diff.md")]
    pub out: PathBuf,
}

impl Cli {
    /// Validate flag combinations and return errors for invalid usage
    pub fn validate(&self) -> anyhow::Result<()> {
        // Verbose and quiet are mutually exclusive
        if self.verbose && self.quiet {
            anyhow::bail!("Cannot specify both --verbose and --quiet");
        }

        if let Command::Run(ref run) = self.command {
            if let Some(ref tag) = run.tag {
                if tag.is_empty()
                    || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    anyhow::bail!(
                        "Invalid --tag '{}': use only letters, digits, '-' and '_'",
                        tag
                    );
                }
            }
        }

        Ok(())
    }

    /// Determine log level based on verbose/quiet flags
    pub fn log_level(&self) -> &str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

impl RunArgs {
    /// Check if the progress bar should be shown
    pub fn should_show_progress(&self) -> bool {
        !self.no_progress && is_terminal::is_terminal(std::io::stderr())
    }
}
