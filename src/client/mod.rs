// src/client/mod.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Why a remote read could not be completed. Every variant is an
/// expected condition, not a crash: probes fold the `Display` string
/// into their failure detail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("not found on the remote host")]
    NotFound,
    #[error("rate limited by the remote host")]
    RateLimited,
    #[error("remote call timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// One entry of a recursive file listing.
#[derive(Clone, Debug, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: "blob".to_string(),
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// Summary of one workflow run, newest first in listings.
#[derive(Clone, Debug, Deserialize)]
pub struct RunSummary {
    pub id: u64,
    pub conclusion: Option<String>,
    pub status: Option<String>,
    pub run_number: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.conclusion.as_deref() == Some("success")
    }

    pub fn duration_secs(&self) -> i64 {
        (self.updated_at - self.created_at).num_seconds()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct JobSummary {
    pub name: String,
    pub conclusion: Option<String>,
}

#[derive(Clone, Debug)]
pub struct BranchProtection {
    pub pull_request_review_required: bool,
}

#[derive(Clone, Debug)]
pub struct ContainerPackage {
    pub name: String,
}

/// Outcome of a bounded-time GET against an arbitrary URL. Never an
/// error: unreachable is a legitimate audit finding.
#[derive(Clone, Debug)]
pub struct HttpProbe {
    pub reachable: bool,
    pub status: Option<u16>,
}

/// Read-only view of a remote code host, scoped to what the probes
/// need. All reads target the default branch tip. Implementations must
/// degrade to a `HostError` rather than panic or stall; the shared
/// reference is safe to use from concurrent probe evaluations.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Full recursive file listing of the default branch.
    async fn fetch_tree(&self, owner: &str, repo: &str) -> HostResult<Vec<TreeEntry>>;

    /// Raw text content of one file at the default branch tip.
    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> HostResult<String>;

    /// Most recent workflow runs on the default branch, newest first.
    async fn fetch_latest_runs(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> HostResult<Vec<RunSummary>>;

    async fn fetch_run_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> HostResult<Vec<JobSummary>>;

    /// Protection rules of the default branch. `NotFound` means the
    /// branch is simply not protected.
    async fn fetch_branch_protection(
        &self,
        owner: &str,
        repo: &str,
    ) -> HostResult<BranchProtection>;

    /// Container packages published for this repository.
    async fn fetch_container_packages(
        &self,
        owner: &str,
        repo: &str,
    ) -> HostResult<Vec<ContainerPackage>>;

    /// Bounded-time GET against an arbitrary URL, without host
    /// credentials attached.
    async fn probe_http(&self, url: &str, timeout: Duration) -> HttpProbe;
}

pub mod github;
pub mod mocks;

pub use github::GitHubHost;
pub use mocks::MockHost;
