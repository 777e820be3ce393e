// src/probes/mod.rs

use async_trait::async_trait;
use std::collections::HashSet;

use crate::client::{HostResult, RepoHost};
use crate::types::{Category, RosterRecord, Verdict};

pub mod composite;
pub mod deploy;
pub mod history;
pub mod pipeline;
pub mod presence;

/// Static identity of one probe: unique id, weight, rubric category
/// and the label shown on the leaderboard.
#[derive(Clone, Copy, Debug)]
pub struct ProbeSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub points: u32,
    pub category: Category,
}

/// One independently evaluable, weighted criterion. Evaluation is a
/// pure function of the host and the repository identity: no probe
/// depends on another probe's outcome, so execution order is free.
///
/// An `Err` return is a probe-internal defect; the executor converts
/// it into a failed verdict. Expected remote unavailability must be
/// handled inside `evaluate` and reported through the verdict detail.
#[async_trait]
pub trait Probe: Send + Sync {
    fn spec(&self) -> ProbeSpec;

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        owner: &str,
        repo: &str,
        record: &RosterRecord,
    ) -> anyhow::Result<Verdict>;
}

/// The fixed probe catalogue for a run. Constructed once and passed by
/// reference into the executor; insertion order is display order.
pub struct ProbeRegistry {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeRegistry {
    /// The standard rubric: 18 probes, 135 points.
    pub fn standard() -> Self {
        Self::new(vec![
            // Fundamentals
            Box::new(pipeline::PipelineExists),
            Box::new(presence::DockerfilePresent),
            Box::new(pipeline::lint_configured()),
            Box::new(composite::TestsExist),
            Box::new(history::PipelineGreen),
            // Intermediate
            Box::new(history::TestsPass),
            Box::new(pipeline::docker_builds()),
            Box::new(history::PipelineFast),
            Box::new(presence::CodeReviewRequired),
            Box::new(composite::CoverageTracked),
            // Advanced
            Box::new(pipeline::security_scan()),
            Box::new(pipeline::quality_gate()),
            Box::new(pipeline::auto_deploy()),
            Box::new(pipeline::MultiEnvironment),
            Box::new(pipeline::DependencyUpdates),
            Box::new(presence::ContainerPublished),
            Box::new(composite::NoSecrets),
            Box::new(deploy::Deployed),
        ])
    }

    /// Panics on a duplicate id: that is a programmer error in the
    /// catalogue, not a runtime condition.
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        let mut seen = HashSet::new();
        for probe in &probes {
            let id = probe.spec().id;
            assert!(seen.insert(id), "duplicate probe id: {id}");
        }
        Self { probes }
    }

    pub fn probes(&self) -> &[Box<dyn Probe>] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Sum of points over the whole catalogue; identical for every
    /// repository regardless of verdicts.
    pub fn total_possible(&self) -> u32 {
        self.probes.iter().map(|p| p.spec().points).sum()
    }
}

pub(crate) const WORKFLOW_DIR: &str = ".github/workflows/";

/// Enumerates workflow definition files with their contents. Files
/// listed in the tree but unfetchable are skipped rather than failing
/// the whole scan.
pub(crate) async fn workflow_files(
    host: &dyn RepoHost,
    owner: &str,
    repo: &str,
) -> HostResult<Vec<(String, String)>> {
    let tree = host.fetch_tree(owner, repo).await?;
    let mut files = Vec::new();
    for entry in tree {
        if !entry.is_blob() || !entry.path.starts_with(WORKFLOW_DIR) {
            continue;
        }
        if !(entry.path.ends_with(".yml") || entry.path.ends_with(".yaml")) {
            continue;
        }
        match host.fetch_file(owner, repo, &entry.path).await {
            Ok(body) => files.push((entry.path, body)),
            Err(e) => tracing::warn!(path = %entry.path, error = %e, "skipping unreadable workflow file"),
        }
    }
    Ok(files)
}

/// Case-insensitive substring match; returns the first keyword found.
pub(crate) fn find_keyword<'k>(haystack: &str, keywords: &[&'k str]) -> Option<&'k str> {
    let lower = haystack.to_lowercase();
    keywords.iter().copied().find(|k| lower.contains(k))
}
