// src/probes/deploy.rs

use async_trait::async_trait;
use std::time::Duration;

use super::{Probe, ProbeSpec};
use crate::client::RepoHost;
use crate::types::{Category, RosterRecord, Verdict};

const DEPLOY_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

/// The declared deploy URL answers a bounded-time GET with a 2xx.
/// Requires `deploy_url` on the roster record.
pub struct Deployed;

#[async_trait]
impl Probe for Deployed {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "deployed",
            label: "Deployment reachable",
            points: 15,
            category: Category::Advanced,
        }
    }

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        _owner: &str,
        _repo: &str,
        record: &RosterRecord,
    ) -> anyhow::Result<Verdict> {
        let url = match &record.deploy_url {
            Some(url) => url,
            None => return Ok(Verdict::fail("no deploy URL provided")),
        };

        let probe = host.probe_http(url, DEPLOY_PROBE_TIMEOUT).await;
        Ok(match probe.status {
            Some(status) if probe.reachable && (200..300).contains(&status) => {
                Verdict::pass(format!("GET {url} returned {status}"))
            }
            Some(status) => Verdict::fail(format!("GET {url} returned {status}")),
            None => Verdict::fail(format!("{url} unreachable within {}s", DEPLOY_PROBE_TIMEOUT.as_secs())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockHost;

    fn record(deploy_url: Option<&str>) -> RosterRecord {
        RosterRecord {
            team: "A".to_string(),
            members: vec![],
            repo: "x/y".to_string(),
            deploy_url: deploy_url.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn missing_url_fails_immediately() {
        let host = MockHost::new();
        let verdict = Deployed
            .evaluate(&host, "x", "y", &record(None))
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.detail, "no deploy URL provided");
    }

    #[tokio::test]
    async fn ok_status_passes() {
        let host = MockHost::new().with_http("https://example.test/health", true, Some(200));
        let verdict = Deployed
            .evaluate(&host, "x", "y", &record(Some("https://example.test/health")))
            .await
            .unwrap();
        assert!(verdict.passed);
        assert!(verdict.detail.contains("200"));
    }

    #[tokio::test]
    async fn server_error_fails() {
        let host = MockHost::new().with_http("https://example.test/health", true, Some(500));
        let verdict = Deployed
            .evaluate(&host, "x", "y", &record(Some("https://example.test/health")))
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("500"));
    }

    #[tokio::test]
    async fn unreachable_url_fails() {
        let host = MockHost::new();
        let verdict = Deployed
            .evaluate(&host, "x", "y", &record(Some("https://down.example.test")))
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("unreachable"));
    }
}
