use cicd_auditor::client::mocks::{job, run};
use cicd_auditor::{
    audit_roster, build_leaderboard, run_audit, HostError, MockHost, ProbeRegistry, RosterRecord,
};

fn record(team: &str, repo: &str, deploy_url: Option<&str>) -> RosterRecord {
    RosterRecord {
        team: team.to_string(),
        members: vec!["ada".to_string(), "grace".to_string()],
        repo: repo.to_string(),
        deploy_url: deploy_url.map(str::to_string),
    }
}

/// The golden scenario: one workflow with pytest and docker build,
/// latest run green, no deploy URL.
#[tokio::test]
async fn golden_scenario_single_team() {
    let host = MockHost::new()
        .with_file("x/y", "tests/test_api.py", "def test_ok(): pass")
        .with_file(
            "x/y",
            ".github/workflows/ci.yml",
            "jobs:\n  ci:\n    steps:\n      - run: pytest\n      - run: docker build -t app .",
        )
        .with_runs("x/y", vec![run(1, 3, Some("success"), 100)])
        .with_jobs("x/y", 1, vec![job("ci", Some("success"))]);

    let registry = ProbeRegistry::standard();
    let audit = run_audit(&host, &registry, &record("A", "x/y", None)).await;

    assert!(audit.result("tests_exist").unwrap().passed);
    assert!(audit.result("docker_builds").unwrap().passed);
    assert!(audit.result("pipeline_green").unwrap().passed);
    assert!(audit.result("pipeline_exists").unwrap().passed);

    let deployed = audit.result("deployed").unwrap();
    assert!(!deployed.passed);
    assert_eq!(deployed.detail, "no deploy URL provided");
}

#[tokio::test]
async fn deploy_url_status_drives_deployed_probe() {
    let registry = ProbeRegistry::standard();

    let ok = MockHost::new().with_http("https://example.test/health", true, Some(200));
    let audit = run_audit(
        &ok,
        &registry,
        &record("A", "x/y", Some("https://example.test/health")),
    )
    .await;
    assert!(audit.result("deployed").unwrap().passed);

    let broken = MockHost::new().with_http("https://example.test/health", true, Some(500));
    let audit = run_audit(
        &broken,
        &registry,
        &record("A", "x/y", Some("https://example.test/health")),
    )
    .await;
    assert!(!audit.result("deployed").unwrap().passed);
}

#[tokio::test]
async fn no_workflows_fails_pipeline_probes_with_distinct_details() {
    let host = MockHost::new().with_file("x/y", "README.md", "hello");
    let registry = ProbeRegistry::standard();

    let audit = run_audit(&host, &registry, &record("A", "x/y", None)).await;

    let dependent = [
        "pipeline_exists",
        "lint_configured",
        "docker_builds",
        "security_scan",
        "quality_gate",
        "auto_deploy",
        "multi_environment",
        "coverage_tracked",
    ];
    let mut details = Vec::new();
    for id in dependent {
        let result = audit.result(id).unwrap();
        assert!(!result.passed, "{id} should fail without workflows");
        assert!(!result.detail.is_empty());
        details.push(result.detail.clone());
    }
    // Details are probe-specific, not one shared string.
    let unique: std::collections::HashSet<_> = details.iter().collect();
    assert!(unique.len() > 1);
}

#[tokio::test]
async fn every_audit_reports_the_registry_wide_total() {
    let registry = ProbeRegistry::standard();
    let healthy = MockHost::new()
        .with_file("x/a", ".github/workflows/ci.yml", "run: pytest")
        .with_runs("x/a", vec![run(1, 1, Some("success"), 60)]);
    let roster = vec![record("A", "x/a", None), record("B", "x/b", None)];

    let audits = audit_roster(&healthy, &registry, &roster, 2, None).await;

    assert_eq!(audits.len(), roster.len());
    for audit in &audits {
        assert_eq!(audit.max_total, registry.total_possible());
        assert_eq!(audit.results.len(), registry.len());
        let summed: u32 = audit.results.iter().map(|(_, r)| r.awarded).sum();
        assert_eq!(summed, audit.total);
    }
}

#[tokio::test]
async fn unreachable_repository_still_appears_with_explanations() {
    let registry = ProbeRegistry::standard();
    let host = MockHost::new().with_outage(HostError::NotFound);
    let roster = vec![record("Gone", "x/deleted", None)];

    let audits = audit_roster(&host, &registry, &roster, 1, None).await;
    let doc = build_leaderboard(audits, registry.total_possible());

    assert_eq!(doc.teams.len(), 1);
    let entry = &doc.teams[0];
    assert_eq!(entry.audit.total, 0);
    for (id, result) in &entry.audit.results {
        assert!(!result.passed, "{id} should fail for an unreadable repo");
        assert!(!result.detail.is_empty(), "{id} must explain itself");
    }
}

#[tokio::test]
async fn tied_totals_keep_roster_order_with_distinct_ranks() {
    let registry = ProbeRegistry::standard();
    // Identical remote state for both repos: identical totals.
    let host = MockHost::new()
        .with_file("x/a", ".github/workflows/ci.yml", "run: pytest")
        .with_runs("x/a", vec![run(1, 1, Some("success"), 60)])
        .with_file("x/b", ".github/workflows/ci.yml", "run: pytest")
        .with_runs("x/b", vec![run(1, 1, Some("success"), 60)]);
    let roster = vec![record("First", "x/a", None), record("Second", "x/b", None)];

    let audits = audit_roster(&host, &registry, &roster, 2, None).await;
    assert_eq!(audits[0].total, audits[1].total);

    let doc = build_leaderboard(audits, registry.total_possible());
    assert_eq!(doc.teams[0].audit.team, "First");
    assert_eq!(doc.teams[1].audit.team, "Second");
    assert_eq!(doc.teams[0].rank, 1);
    assert_eq!(doc.teams[1].rank, 2);
}

#[tokio::test]
async fn identical_remote_state_is_idempotent() {
    let registry = ProbeRegistry::standard();
    let build_host = || {
        MockHost::new()
            .with_file("x/y", "Dockerfile", "FROM python:3.12")
            .with_file(
                "x/y",
                ".github/workflows/ci.yml",
                "run: pytest --cov\nrun: docker build .",
            )
            .with_file("x/y", "tests/test_app.py", "def test(): pass")
            .with_runs("x/y", vec![run(1, 9, Some("success"), 90)])
            .with_jobs("x/y", 1, vec![job("build-and-test", Some("success"))])
    };

    let first = run_audit(&build_host(), &registry, &record("A", "x/y", None)).await;
    let second = run_audit(&build_host(), &registry, &record("A", "x/y", None)).await;

    assert_eq!(first.total, second.total);
    for ((id_a, a), (id_b, b)) in first.results.iter().zip(second.results.iter()) {
        assert_eq!(id_a, id_b);
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.detail, b.detail);
    }
}

#[tokio::test]
async fn document_serializes_with_published_field_names() {
    let registry = ProbeRegistry::standard();
    let host = MockHost::new()
        .with_file("x/y", ".github/workflows/ci.yml", "run: pytest")
        .with_runs("x/y", vec![run(1, 1, Some("success"), 60)]);
    let roster = vec![record("A", "x/y", Some("https://a.test"))];

    let audits = audit_roster(&host, &registry, &roster, 1, None).await;
    let doc = build_leaderboard(audits, registry.total_possible());
    let value: serde_json::Value = serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();

    assert!(value["generated_at"].is_string());
    assert_eq!(value["total_possible"], 135);
    let team = &value["teams"][0];
    assert_eq!(team["team"], "A");
    assert_eq!(team["repo"], "x/y");
    assert_eq!(team["deploy_url"], "https://a.test");
    assert_eq!(team["rank"], 1);
    assert_eq!(team["maxTotal"], 135);
    let green = &team["results"]["pipeline_green"];
    assert_eq!(green["pass"], true);
    assert_eq!(green["points"], 10);
    assert_eq!(green["category"], "fundamentals");
    assert!(green["detail"].is_string());
    assert_eq!(team["members"].as_array().unwrap().len(), 2);
}
