// src/client/mocks.rs

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;

use super::{
    BranchProtection, ContainerPackage, HostError, HostResult, HttpProbe, JobSummary, RepoHost,
    RunSummary, TreeEntry,
};

/// In-memory [`RepoHost`] for tests. Built up with the `with_*`
/// methods; anything not registered behaves as `NotFound`, and
/// `with_outage` makes every fetcher fail with the given error.
#[derive(Default)]
pub struct MockHost {
    trees: HashMap<String, Vec<TreeEntry>>,
    files: HashMap<(String, String), String>,
    runs: HashMap<String, Vec<RunSummary>>,
    jobs: HashMap<(String, u64), Vec<JobSummary>>,
    protection: HashMap<String, BranchProtection>,
    packages: HashMap<String, Vec<ContainerPackage>>,
    http: HashMap<String, HttpProbe>,
    outage: Option<HostError>,
}

fn key(owner: &str, repo: &str) -> String {
    format!("{owner}/{repo}")
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file and lists it in the repository tree.
    pub fn with_file(mut self, repo: &str, path: &str, body: &str) -> Self {
        self.trees
            .entry(repo.to_string())
            .or_default()
            .push(TreeEntry::blob(path));
        self.files
            .insert((repo.to_string(), path.to_string()), body.to_string());
        self
    }

    /// Lists extra paths in the tree without backing content.
    pub fn with_tree_paths(mut self, repo: &str, paths: &[&str]) -> Self {
        let tree = self.trees.entry(repo.to_string()).or_default();
        for path in paths {
            tree.push(TreeEntry::blob(*path));
        }
        self
    }

    pub fn with_runs(mut self, repo: &str, runs: Vec<RunSummary>) -> Self {
        self.runs.insert(repo.to_string(), runs);
        self
    }

    pub fn with_jobs(mut self, repo: &str, run_id: u64, jobs: Vec<JobSummary>) -> Self {
        self.jobs.insert((repo.to_string(), run_id), jobs);
        self
    }

    pub fn with_protection(mut self, repo: &str, review_required: bool) -> Self {
        self.protection.insert(
            repo.to_string(),
            BranchProtection {
                pull_request_review_required: review_required,
            },
        );
        self
    }

    pub fn with_packages(mut self, repo: &str, names: &[&str]) -> Self {
        self.packages.insert(
            repo.to_string(),
            names
                .iter()
                .map(|n| ContainerPackage {
                    name: n.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn with_http(mut self, url: &str, reachable: bool, status: Option<u16>) -> Self {
        self.http
            .insert(url.to_string(), HttpProbe { reachable, status });
        self
    }

    pub fn with_outage(mut self, error: HostError) -> Self {
        self.outage = Some(error);
        self
    }

    fn check_outage(&self) -> HostResult<()> {
        match &self.outage {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Builds a run summary with a deterministic timestamp base.
pub fn run(id: u64, run_number: u64, conclusion: Option<&str>, duration_secs: i64) -> RunSummary {
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
        + ChronoDuration::hours(id as i64);
    RunSummary {
        id,
        conclusion: conclusion.map(str::to_string),
        status: Some("completed".to_string()),
        run_number,
        created_at,
        updated_at: created_at + ChronoDuration::seconds(duration_secs),
    }
}

pub fn job(name: &str, conclusion: Option<&str>) -> JobSummary {
    JobSummary {
        name: name.to_string(),
        conclusion: conclusion.map(str::to_string),
    }
}

#[async_trait]
impl RepoHost for MockHost {
    async fn fetch_tree(&self, owner: &str, repo: &str) -> HostResult<Vec<TreeEntry>> {
        self.check_outage()?;
        self.trees
            .get(&key(owner, repo))
            .cloned()
            .ok_or(HostError::NotFound)
    }

    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> HostResult<String> {
        self.check_outage()?;
        self.files
            .get(&(key(owner, repo), path.to_string()))
            .cloned()
            .ok_or(HostError::NotFound)
    }

    async fn fetch_latest_runs(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> HostResult<Vec<RunSummary>> {
        self.check_outage()?;
        let mut runs = self
            .runs
            .get(&key(owner, repo))
            .cloned()
            .ok_or(HostError::NotFound)?;
        runs.truncate(limit as usize);
        Ok(runs)
    }

    async fn fetch_run_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> HostResult<Vec<JobSummary>> {
        self.check_outage()?;
        self.jobs
            .get(&(key(owner, repo), run_id))
            .cloned()
            .ok_or(HostError::NotFound)
    }

    async fn fetch_branch_protection(
        &self,
        owner: &str,
        repo: &str,
    ) -> HostResult<BranchProtection> {
        self.check_outage()?;
        self.protection
            .get(&key(owner, repo))
            .cloned()
            .ok_or(HostError::NotFound)
    }

    async fn fetch_container_packages(
        &self,
        owner: &str,
        repo: &str,
    ) -> HostResult<Vec<ContainerPackage>> {
        self.check_outage()?;
        self.packages
            .get(&key(owner, repo))
            .cloned()
            .ok_or(HostError::NotFound)
    }

    async fn probe_http(&self, url: &str, _timeout: Duration) -> HttpProbe {
        self.http.get(url).cloned().unwrap_or(HttpProbe {
            reachable: false,
            status: None,
        })
    }
}
