use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cicd_auditor::{audit_roster, build_leaderboard, load_roster, GitHubHost, ProbeRegistry};

/// Audits every roster repository against the CI/CD maturity rubric
/// and writes the ranked leaderboard document.
#[derive(Parser)]
#[command(name = "cicd-auditor", version, about)]
struct Cli {
    /// Path to the roster JSON file
    #[arg(long)]
    roster: PathBuf,

    /// Where to write the leaderboard document
    #[arg(long, default_value = "leaderboard.json")]
    output: PathBuf,

    /// Maximum repositories audited in parallel
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Abandon unprocessed repositories after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// API token for the code host
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let roster = load_roster(&cli.roster)?;
    let host = GitHubHost::new(&cli.token)?;
    let registry = ProbeRegistry::standard();
    info!(
        teams = roster.len(),
        probes = registry.len(),
        total_possible = registry.total_possible(),
        "starting audit run"
    );

    let audits = audit_roster(
        &host,
        &registry,
        &roster,
        cli.concurrency,
        cli.deadline_secs.map(Duration::from_secs),
    )
    .await;

    let document = build_leaderboard(audits, registry.total_possible());
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(&cli.output, json)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;

    info!(path = %cli.output.display(), teams = document.teams.len(), "leaderboard written");
    Ok(())
}
