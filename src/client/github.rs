// src/client/github.rs

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{
    BranchProtection, ContainerPackage, HostError, HostResult, HttpProbe, JobSummary, RepoHost,
    RunSummary, TreeEntry,
};

const API_BASE: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

/// GitHub REST implementation of [`RepoHost`].
///
/// Carries a bearer token for API reads and a separate credential-free
/// client for probing arbitrary deploy URLs. The default branch of each
/// repository is resolved once and cached for the run.
pub struct GitHubHost {
    api: reqwest::Client,
    plain: reqwest::Client,
    default_branches: Mutex<HashMap<String, String>>,
}

impl GitHubHost {
    pub fn new(token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("cicd-auditor"));

        let api = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let plain = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            api,
            plain,
            default_branches: Mutex::new(HashMap::new()),
        })
    }

    /// Issues one authenticated GET. A rate-limited response gets a
    /// single bounded backoff retry before degrading to `RateLimited`.
    async fn get(&self, url: &str, accept: Option<&'static str>) -> HostResult<reqwest::Response> {
        for attempt in 0..2 {
            let mut request = self.api.get(url);
            if let Some(media_type) = accept {
                request = request.header(ACCEPT, media_type);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    HostError::Timeout
                } else {
                    HostError::Network(e.to_string())
                }
            })?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(HostError::NotFound);
            }
            if is_rate_limited(status, &response) {
                if attempt == 0 {
                    tracing::warn!(%url, "rate limited, backing off before one retry");
                    tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                    continue;
                }
                return Err(HostError::RateLimited);
            }
            if !status.is_success() {
                return Err(HostError::InvalidResponse(format!("status {status}")));
            }
            return Ok(response);
        }
        Err(HostError::RateLimited)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> HostResult<T> {
        let response = self.get(url, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))
    }

    async fn default_branch(&self, owner: &str, repo: &str) -> HostResult<String> {
        let key = format!("{owner}/{repo}");
        if let Some(branch) = self.default_branches.lock().await.get(&key) {
            return Ok(branch.clone());
        }

        let info: RepoInfo = self
            .get_json(&format!("{API_BASE}/repos/{owner}/{repo}"))
            .await?;
        self.default_branches
            .lock()
            .await
            .insert(key, info.default_branch.clone());
        Ok(info.default_branch)
    }
}

fn is_rate_limited(status: StatusCode, response: &reqwest::Response) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct RunsResponse {
    workflow_runs: Vec<RunSummary>,
}

#[derive(Debug, Deserialize)]
struct JobsResponse {
    jobs: Vec<JobSummary>,
}

#[derive(Debug, Deserialize)]
struct ProtectionResponse {
    required_pull_request_reviews: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PackageEntry {
    name: String,
    repository: Option<PackageRepository>,
}

#[derive(Debug, Deserialize)]
struct PackageRepository {
    name: String,
}

#[async_trait]
impl RepoHost for GitHubHost {
    async fn fetch_tree(&self, owner: &str, repo: &str) -> HostResult<Vec<TreeEntry>> {
        let branch = self.default_branch(owner, repo).await?;
        let response: TreeResponse = self
            .get_json(&format!(
                "{API_BASE}/repos/{owner}/{repo}/git/trees/{branch}?recursive=1"
            ))
            .await?;
        Ok(response.tree)
    }

    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> HostResult<String> {
        let branch = self.default_branch(owner, repo).await?;
        let response = self
            .get(
                &format!("{API_BASE}/repos/{owner}/{repo}/contents/{path}?ref={branch}"),
                Some("application/vnd.github.raw"),
            )
            .await?;
        response
            .text()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))
    }

    async fn fetch_latest_runs(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> HostResult<Vec<RunSummary>> {
        let branch = self.default_branch(owner, repo).await?;
        let response: RunsResponse = self
            .get_json(&format!(
                "{API_BASE}/repos/{owner}/{repo}/actions/runs?branch={branch}&per_page={limit}"
            ))
            .await?;
        Ok(response.workflow_runs)
    }

    async fn fetch_run_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> HostResult<Vec<JobSummary>> {
        let response: JobsResponse = self
            .get_json(&format!(
                "{API_BASE}/repos/{owner}/{repo}/actions/runs/{run_id}/jobs"
            ))
            .await?;
        Ok(response.jobs)
    }

    async fn fetch_branch_protection(
        &self,
        owner: &str,
        repo: &str,
    ) -> HostResult<BranchProtection> {
        let branch = self.default_branch(owner, repo).await?;
        let response: ProtectionResponse = self
            .get_json(&format!(
                "{API_BASE}/repos/{owner}/{repo}/branches/{branch}/protection"
            ))
            .await?;
        Ok(BranchProtection {
            pull_request_review_required: response.required_pull_request_reviews.is_some(),
        })
    }

    async fn fetch_container_packages(
        &self,
        owner: &str,
        repo: &str,
    ) -> HostResult<Vec<ContainerPackage>> {
        // Packages live under the org namespace; fall back to the user
        // namespace for personal accounts.
        let org_url = format!("{API_BASE}/orgs/{owner}/packages?package_type=container");
        let packages: Vec<PackageEntry> = match self.get_json(&org_url).await {
            Ok(packages) => packages,
            Err(HostError::NotFound) => {
                let user_url = format!("{API_BASE}/users/{owner}/packages?package_type=container");
                self.get_json(&user_url).await?
            }
            Err(e) => return Err(e),
        };

        Ok(packages
            .into_iter()
            .filter(|p| {
                p.repository.as_ref().map(|r| r.name == repo).unwrap_or(false)
                    || p.name == repo
                    || p.name.starts_with(&format!("{repo}/"))
            })
            .map(|p| ContainerPackage { name: p.name })
            .collect())
    }

    async fn probe_http(&self, url: &str, timeout: Duration) -> HttpProbe {
        match self.plain.get(url).timeout(timeout).send().await {
            Ok(response) => HttpProbe {
                reachable: true,
                status: Some(response.status().as_u16()),
            },
            Err(e) => {
                tracing::warn!(%url, error = %e, "deploy URL probe failed");
                HttpProbe {
                    reachable: false,
                    status: None,
                }
            }
        }
    }
}
