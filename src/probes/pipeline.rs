// src/probes/pipeline.rs
//
// Pipeline-content probes: enumerate workflow definition files and
// match enumerated keyword sets. Heuristic by design; the keyword
// lists are the documented detection surface, not a YAML parser.

use async_trait::async_trait;

use super::{find_keyword, workflow_files, Probe, ProbeSpec};
use crate::client::RepoHost;
use crate::types::{Category, RosterRecord, Verdict};

/// Passes iff any workflow definition exists under `.github/workflows`.
pub struct PipelineExists;

#[async_trait]
impl Probe for PipelineExists {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "pipeline_exists",
            label: "CI pipeline configured",
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
        Ok(match workflow_files(host, owner, repo).await {
            Ok(files) if !files.is_empty() => Verdict::pass(format!(
                "{} workflow file(s) under .github/workflows",
                files.len()
            )),
            Ok(_) => Verdict::fail("no workflow files under .github/workflows"),
            Err(e) => Verdict::fail(format!("cannot enumerate workflows: {e}")),
        })
    }
}

/// Shared shape for keyword probes: first workflow file containing any
/// keyword short-circuits to a pass.
pub struct KeywordProbe {
    spec: ProbeSpec,
    keywords: &'static [&'static str],
    /// Short phrase naming what the keywords detect, used to keep the
    /// failure details distinct per probe.
    topic: &'static str,
}

#[async_trait]
impl Probe for KeywordProbe {
    fn spec(&self) -> ProbeSpec {
        self.spec
    }

    async fn evaluate(
        &self,
        host: &dyn RepoHost,
        owner: &str,
        repo: &str,
        _record: &RosterRecord,
    ) -> anyhow::Result<Verdict> {
        let files = match workflow_files(host, owner, repo).await {
            Ok(files) => files,
            Err(e) => {
                return Ok(Verdict::fail(format!(
                    "cannot scan workflows for {}: {e}",
                    self.topic
                )))
            }
        };
        if files.is_empty() {
            return Ok(Verdict::fail(format!(
                "no workflow files to scan for {}",
                self.topic
            )));
        }
        for (path, body) in &files {
            if let Some(keyword) = find_keyword(body, self.keywords) {
                return Ok(Verdict::pass(format!("'{keyword}' found in {path}")));
            }
        }
        Ok(Verdict::fail(format!(
            "no {} keyword in {} workflow file(s)",
            self.topic,
            files.len()
        )))
    }
}

pub fn lint_configured() -> KeywordProbe {
    KeywordProbe {
        spec: ProbeSpec {
            id: "lint_configured",
            label: "Lint step in pipeline",
            points: 5,
            category: Category::Fundamentals,
        },
        keywords: &[
            "ruff",
            "flake8",
            "pylint",
            "eslint",
            "clippy",
            "golangci-lint",
            "rubocop",
            "black --check",
            "prettier --check",
            "lint",
        ],
        topic: "lint tool",
    }
}

pub fn docker_builds() -> KeywordProbe {
    KeywordProbe {
        spec: ProbeSpec {
            id: "docker_builds",
            label: "Image built in pipeline",
            points: 10,
            category: Category::Intermediate,
        },
        keywords: &[
            "docker build",
            "docker/build-push-action",
            "buildx",
            "podman build",
            "docker compose build",
            "docker-compose build",
            "kaniko",
        ],
        topic: "image build",
    }
}

pub fn security_scan() -> KeywordProbe {
    KeywordProbe {
        spec: ProbeSpec {
            id: "security_scan",
            label: "Security scanning in pipeline",
            points: 10,
            category: Category::Advanced,
        },
        keywords: &[
            "trivy",
            "bandit",
            "snyk",
            "codeql",
            "npm audit",
            "pip-audit",
            "safety",
            "gitleaks",
            "semgrep",
            "grype",
        ],
        topic: "security scanner",
    }
}

pub fn quality_gate() -> KeywordProbe {
    KeywordProbe {
        spec: ProbeSpec {
            id: "quality_gate",
            label: "Quality gate enforced",
            points: 5,
            category: Category::Advanced,
        },
        keywords: &[
            "sonarqube",
            "sonarcloud",
            "sonar-scanner",
            "quality gate",
            "codeclimate",
            "codacy",
        ],
        topic: "quality gate",
    }
}

pub fn auto_deploy() -> KeywordProbe {
    KeywordProbe {
        spec: ProbeSpec {
            id: "auto_deploy",
            label: "Automated deployment",
            points: 10,
            category: Category::Advanced,
        },
        keywords: &[
            "deploy",
            "kubectl apply",
            "helm upgrade",
            "terraform apply",
            "fly deploy",
            "gcloud run",
            "aws ecs",
            "azure webapp",
            "railway up",
            "ansible-playbook",
        ],
        topic: "deployment step",
    }
}

const ENVIRONMENT_NAMES: &[&str] = &["production", "staging", "preprod", "preview", "qa", "development"];

/// Passes iff at least two distinct environment names appear across the
/// workflow files.
pub struct MultiEnvironment;

#[async_trait]
impl Probe for MultiEnvironment {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "multi_environment",
            label: "Multiple deployment environments",
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
        let files = match workflow_files(host, owner, repo).await {
            Ok(files) => files,
            Err(e) => {
                return Ok(Verdict::fail(format!(
                    "cannot scan workflows for environments: {e}"
                )))
            }
        };
        if files.is_empty() {
            return Ok(Verdict::fail("no workflow files to scan for environments"));
        }

        let combined: String = files
            .iter()
            .map(|(_, body)| body.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");
        let found: Vec<&str> = ENVIRONMENT_NAMES
            .iter()
            .copied()
            .filter(|name| combined.contains(name))
            .collect();

        Ok(if found.len() >= 2 {
            Verdict::pass(format!("environments referenced: {}", found.join(", ")))
        } else {
            Verdict::fail(format!(
                "fewer than two environment names in {} workflow file(s)",
                files.len()
            ))
        })
    }
}

const DEPENDENCY_BOT_CONFIGS: &[&str] = &[
    ".github/dependabot.yml",
    ".github/dependabot.yaml",
    "renovate.json",
    ".github/renovate.json",
];

/// Passes on a dependency-update bot config file, or failing that, a
/// dependabot/renovate mention in a workflow.
pub struct DependencyUpdates;

#[async_trait]
impl Probe for DependencyUpdates {
    fn spec(&self) -> ProbeSpec {
        ProbeSpec {
            id: "dependency_updates",
            label: "Automated dependency updates",
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
        for path in DEPENDENCY_BOT_CONFIGS {
            if host.fetch_file(owner, repo, path).await.is_ok() {
                return Ok(Verdict::pass(format!("{path} present")));
            }
        }

        match workflow_files(host, owner, repo).await {
            Ok(files) => {
                for (path, body) in &files {
                    if let Some(keyword) = find_keyword(body, &["dependabot", "renovate"]) {
                        return Ok(Verdict::pass(format!("'{keyword}' found in {path}")));
                    }
                }
                Ok(Verdict::fail(
                    "no dependency-update bot config or workflow mention",
                ))
            }
            Err(e) => Ok(Verdict::fail(format!(
                "no bot config file, and cannot scan workflows: {e}"
            ))),
        }
    }
}
