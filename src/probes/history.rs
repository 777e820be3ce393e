// src/probes/history.rs
//
// Run-history probes over the most recent workflow runs on the default
// branch. No runs at all is a fail ("no runs found"), never an error.

use async_trait::async_trait;

use super::{Probe, ProbeSpec};
use crate::client::{RepoHost, RunSummary};
use crate::types::{Category, RosterRecord, Verdict};

/// Wall-clock threshold for `pipeline_fast`, mean over the last three
/// successful runs.
const FAST_PIPELINE_SECS: f64 = 180.0;

fn describe_run(run: &RunSummary) -> String {
    match (&run.conclusion, &run.status) {
        (Some(conclusion), _) => format!("run #{} concluded {conclusion}", run.run_number),
        (None, Some(status)) => format!("run #{} is {status}", run.run_number),
        (None, None) => format!("run #{} has no recorded outcome", run.run_number),
    }
}

/// Latest run on the default branch concluded "success".
pub struct PipelineGreen;

#[async_trait]
impl Probe for PipelineGreen {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "pipeline_green",
            label: "Latest pipeline run green",
            points: 10,
            category: Category::Fundamentals,
        }
    }

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        owner: &str,
        repo: &str,
        _record: &RosterRecord,
    ) -> anyhow::Result<Verdict> {
        let runs = match host.fetch_latest_runs(owner, repo, 1).await {
            Ok(runs) => runs,
            Err(e) => return Ok(Verdict::fail(format!("cannot read run history: {e}"))),
        };
        Ok(match runs.first() {
            Some(run) if run.succeeded() => Verdict::pass(describe_run(run)),
            Some(run) => Verdict::fail(format!("latest {}", describe_run(run))),
            None => Verdict::fail("no runs found"),
        })
    }
}

const TEST_JOB_HINTS: &[&str] = &["test", "ci", "build"];

/// Latest run is green AND a job that looks like the test stage
/// succeeded.
pub struct TestsPass;

#[async_trait]
impl Probe for TestsPass {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "tests_pass",
            label: "Tests pass in CI",
            points: 10,
            category: Category::Intermediate,
        }
    }

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        owner: &str,
        repo: &str,
        _record: &RosterRecord,
    ) -> anyhow::Result<Verdict> {
        let runs = match host.fetch_latest_runs(owner, repo, 1).await {
            Ok(runs) => runs,
            Err(e) => return Ok(Verdict::fail(format!("cannot read run history: {e}"))),
        };
        let latest = match runs.first() {
            Some(run) => run,
            None => return Ok(Verdict::fail("no runs found")),
        };
        if !latest.succeeded() {
            return Ok(Verdict::fail(format!(
                "latest {} (not green)",
                describe_run(latest)
            )));
        }

        let jobs = match host.fetch_run_jobs(owner, repo, latest.id).await {
            Ok(jobs) => jobs,
            Err(e) => return Ok(Verdict::fail(format!("cannot read jobs of run #{}: {e}", latest.run_number))),
        };

        let matching: Vec<_> = jobs
            .iter()
            .filter(|job| {
                let name = job.name.to_lowercase();
                TEST_JOB_HINTS.iter().any(|hint| name.contains(hint))
            })
            .collect();
        if matching.is_empty() {
            return Ok(Verdict::fail("no test, ci, or build job in the latest run"));
        }
        // Any matching job succeeding is enough; the others may be
        // skipped or still queued.
        if let Some(job) = matching
            .iter()
            .find(|job| job.conclusion.as_deref() == Some("success"))
        {
            return Ok(Verdict::pass(format!(
                "job '{}' succeeded in run #{}",
                job.name, latest.run_number
            )));
        }
        let outcomes = matching
            .iter()
            .map(|job| {
                format!(
                    "'{}' concluded {}",
                    job.name,
                    job.conclusion.as_deref().unwrap_or("nothing")
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Verdict::fail(format!("no matching job succeeded: {outcomes}")))
    }
}

/// Mean wall-clock duration of the last three successful runs is under
/// the threshold. Fewer than three successful runs: the mean is taken
/// over what exists.
pub struct PipelineFast;

#[async_trait]
impl Probe for PipelineFast {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "pipeline_fast",
            label: "Pipeline completes quickly",
            points: 5,
            category: Category::Intermediate,
        }
    }

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        owner: &str,
        repo: &str,
        _record: &RosterRecord,
    ) -> anyhow::Result<Verdict> {
        let runs = match host.fetch_latest_runs(owner, repo, 10).await {
            Ok(runs) => runs,
            Err(e) => return Ok(Verdict::fail(format!("cannot read run history: {e}"))),
        };
        if runs.is_empty() {
            return Ok(Verdict::fail("no runs found"));
        }

        let successful: Vec<&RunSummary> =
            runs.iter().filter(|r| r.succeeded()).take(3).collect();
        if successful.is_empty() {
            return Ok(Verdict::fail("no successful runs to measure"));
        }

        let mean = successful
            .iter()
            .map(|r| r.duration_secs() as f64)
            .sum::<f64>()
            / successful.len() as f64;
        let summary = format!(
            "mean {:.0}s over last {} successful run(s)",
            mean,
            successful.len()
        );
        Ok(if mean < FAST_PIPELINE_SECS {
            Verdict::pass(summary)
        } else {
            Verdict::fail(format!("{summary}, threshold {FAST_PIPELINE_SECS:.0}s"))
        })
    }
}
