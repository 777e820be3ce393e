// src/audit.rs

use futures::stream::StreamExt;
use futures::future::join_all;
use std::time::Duration;

use crate::client::RepoHost;
use crate::probes::ProbeRegistry;
use crate::types::{ProbeResult, RepositoryAudit, RosterRecord, Verdict};

/// Evaluates every registered probe against one repository.
///
/// Probes run concurrently over the shared read-only host. Each
/// evaluation is isolated: an `Err` from a probe becomes a failed
/// result ("internal error: …") and never aborts its siblings. The
/// returned audit always carries one result per registered probe and
/// `max_total` equal to the registry-wide sum.
pub async fn run_audit(
    host: &dyn RepoHost,
    registry: &ProbeRegistry,
    record: &RosterRecord,
) -> RepositoryAudit {
    let verdicts = match split_repo(&record.repo) {
        Some((owner, repo)) => {
            join_all(
                registry
                    .probes()
                    .iter()
                    .map(|probe| probe.evaluate(host, owner, repo, record)),
            )
            .await
        }
        None => {
            tracing::warn!(team = %record.team, repo = %record.repo, "malformed repository identifier");
            registry
                .probes()
                .iter()
                .map(|_| {
                    Ok(Verdict::fail(format!(
                        "cannot audit: malformed repository identifier '{}'",
                        record.repo
                    )))
                })
                .collect()
        }
    };

    assemble(registry, record, verdicts)
}

fn split_repo(identifier: &str) -> Option<(&str, &str)> {
    match identifier.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Some((owner, repo))
        }
        _ => None,
    }
}

fn assemble(
    registry: &ProbeRegistry,
    record: &RosterRecord,
    verdicts: Vec<anyhow::Result<Verdict>>,
) -> RepositoryAudit {
    let mut results = Vec::with_capacity(registry.len());
    let mut total = 0;

    for (probe, outcome) in registry.probes().iter().zip(verdicts) {
        let spec = probe.spec();
        let verdict = match outcome {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(probe = spec.id, repo = %record.repo, error = %e, "probe evaluation failed unexpectedly");
                Verdict::fail(format!("internal error: {e}"))
            }
        };
        let awarded = if verdict.passed { spec.points } else { 0 };
        total += awarded;
        results.push((
            spec.id.to_string(),
            ProbeResult {
                passed: verdict.passed,
                detail: verdict.detail,
                points: spec.points,
                label: spec.label.to_string(),
                category: spec.category,
                awarded,
            },
        ));
    }

    // One result per registered probe, by construction.
    assert_eq!(results.len(), registry.len());

    RepositoryAudit {
        team: record.team.clone(),
        members: record.members.clone(),
        repo: record.repo.clone(),
        deploy_url: record.deploy_url.clone(),
        total,
        max_total: registry.total_possible(),
        results,
    }
}

/// Audits the whole roster with bounded parallelism, preserving roster
/// order in the output. When the optional deadline elapses, remaining
/// records are abandoned and the completed audits are returned: partial
/// output beats no output.
pub async fn audit_roster(
    host: &dyn RepoHost,
    registry: &ProbeRegistry,
    roster: &[RosterRecord],
    concurrency: usize,
    deadline: Option<Duration>,
) -> Vec<RepositoryAudit> {
    let deadline_at = deadline.map(|d| tokio::time::Instant::now() + d);
    let mut stream = futures::stream::iter(
        roster
            .iter()
            .map(|record| run_audit(host, registry, record)),
    )
    .buffered(concurrency.max(1));

    let mut audits = Vec::with_capacity(roster.len());
    loop {
        let next = match deadline_at {
            Some(at) => match tokio::time::timeout_at(at, stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(
                        completed = audits.len(),
                        roster = roster.len(),
                        "audit deadline reached, abandoning remaining repositories"
                    );
                    break;
                }
            },
            None => stream.next().await,
        };
        match next {
            Some(audit) => audits.push(audit),
            None => break,
        }
    }
    audits
}
