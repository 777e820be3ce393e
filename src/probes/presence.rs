// src/probes/presence.rs
//
// Probes over remote state that either exists or does not: a known
// file, branch protection, published packages. All of them fail
// closed: "cannot verify" is a failed verdict with the reason.

use async_trait::async_trait;

use super::{Probe, ProbeSpec};
use crate::client::{HostError, RepoHost};
use crate::types::{Category, RosterRecord, Verdict};

pub struct DockerfilePresent;

#[async_trait]
impl Probe for DockerfilePresent {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "dockerfile_present",
            label: "Dockerfile present",
            points: 5,
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
        Ok(match host.fetch_file(owner, repo, "Dockerfile").await {
            Ok(_) => Verdict::pass("Dockerfile at repository root"),
            Err(HostError::NotFound) => Verdict::fail("no Dockerfile at repository root"),
            Err(e) => Verdict::fail(format!("cannot check for Dockerfile: {e}")),
        })
    }
}

pub struct CodeReviewRequired;

#[async_trait]
impl Probe for CodeReviewRequired {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "code_review_required",
            label: "Reviews required before merge",
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
        Ok(match host.fetch_branch_protection(owner, repo).await {
            Ok(protection) if protection.pull_request_review_required => {
                Verdict::pass("default branch requires pull request reviews")
            }
            Ok(_) => Verdict::fail("branch protection does not require pull request reviews"),
            // An unprotected branch reports 404 on the protection endpoint.
            Err(HostError::NotFound) => {
                Verdict::fail("default branch has no protection rules")
            }
            Err(e) => Verdict::fail(format!("cannot read branch protection: {e}")),
        })
    }
}

pub struct ContainerPublished;

#[async_trait]
impl Probe for ContainerPublished {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "container_published",
            label: "Container image published",
            points: 5,
            category: Category::Advanced,
        }
    }

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        owner: &str,
        repo: &str,
        _record: &RosterRecord,
    ) -> anyhow::Result<Verdict> {
        Ok(match host.fetch_container_packages(owner, repo).await {
            Ok(packages) if !packages.is_empty() => Verdict::pass(format!(
                "{} container package(s) published",
                packages.len()
            )),
            Ok(_) | Err(HostError::NotFound) => {
                Verdict::fail("no container package published for this repository")
            }
            Err(e) => Verdict::fail(format!("cannot list container packages: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockHost;

    fn record() -> RosterRecord {
        RosterRecord {
            team: "A".to_string(),
            members: vec![],
            repo: "x/y".to_string(),
            deploy_url: None,
        }
    }

    #[tokio::test]
    async fn dockerfile_present_pass_and_fail() {
        let with = MockHost::new().with_file("x/y", "Dockerfile", "FROM python:3.12");
        assert!(
            DockerfilePresent
                .evaluate(&with, "x", "y", &record())
                .await
                .unwrap()
                .passed
        );

        let without = MockHost::new().with_file("x/y", "README.md", "hi");
        let verdict = DockerfilePresent
            .evaluate(&without, "x", "y", &record())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.detail, "no Dockerfile at repository root");
    }

    #[tokio::test]
    async fn review_probe_distinguishes_unprotected_branch() {
        let unprotected = MockHost::new();
        let verdict = CodeReviewRequired
            .evaluate(&unprotected, "x", "y", &record())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("no protection rules"));

        let no_reviews = MockHost::new().with_protection("x/y", false);
        let verdict = CodeReviewRequired
            .evaluate(&no_reviews, "x", "y", &record())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("does not require"));

        let protected = MockHost::new().with_protection("x/y", true);
        assert!(
            CodeReviewRequired
                .evaluate(&protected, "x", "y", &record())
                .await
                .unwrap()
                .passed
        );
    }

    #[tokio::test]
    async fn container_published_requires_nonempty_list() {
        let published = MockHost::new().with_packages("x/y", &["y"]);
        assert!(
            ContainerPublished
                .evaluate(&published, "x", "y", &record())
                .await
                .unwrap()
                .passed
        );

        let none = MockHost::new().with_packages("x/y", &[]);
        assert!(
            !ContainerPublished
                .evaluate(&none, "x", "y", &record())
                .await
                .unwrap()
                .passed
        );
    }
}
