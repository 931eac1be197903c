// src/main.rs
use clap::Parser;
use recon_pilot::cli::{Cli, Command, DiffArgs, RunArgs};
use recon_pilot::config::Scope;
use recon_pilot::ct_log::CtClient;
use recon_pilot::dns::HickorySource;
use recon_pilot::output::Console;
use recon_pilot::rules::RuleSet;
use recon_pilot::runner::{self, RunOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate arguments
    cli.validate()?;

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut console = Console::new();

    match cli.command {
        Command::Run(ref args) => run(args, &mut console).await,
        Command::Diff(ref args) => diff(args, &mut console),
    }
}

async fn run(args: &RunArgs, console: &mut Console) -> anyhow::Result<()> {
    let scope = Scope::from_file(&args.scope)?;
    tracing::info!(
        "Loaded scope for {}: {} domains, {} seed hosts, {} resolvers",
        scope.org,
        scope.domains.len(),
        scope.seeds.hosts.len(),
        scope.resolvers.len()
    );

    let rules = RuleSet::load(args.rules.as_deref())?;
    tracing::debug!("Loaded {} finding rules", rules.findings.len());

    let ct = CtClient::from_config(&scope.sources)?;
    let resolver = HickorySource::new(&scope.resolver_ips(), scope.sources.dns_timeout())?;

    let mut opts = RunOptions::new(&args.out);
    opts.tag = args.tag.clone();
    opts.write_html = !args.no_html;
    opts.show_progress = args.should_show_progress();

    let outcome = runner::run_recon(&scope, &rules, &ct, &resolver, &opts, console).await?;
    tracing::info!("Run directory: {}", outcome.run_dir.display());

    Ok(())
}

fn diff(args: &DiffArgs, console: &mut Console) -> anyhow::Result<()> {
    let delta = runner::run_diff(&args.older, &args.newer, &args.out, console)?;
    tracing::info!(
        "Diff complete: {} new, {} removed",
        delta.new_count,
        delta.removed_count
    );
    Ok(())
}
