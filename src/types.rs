// src/types.rs

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One roster entry, supplied externally and immutable for the run.
#[derive(Clone, Debug, Deserialize)]
pub struct RosterRecord {
    pub team: String,
    #[serde(default)]
    pub members: Vec<String>,
    /// "owner/name" identifier on the code host.
    pub repo: String,
    #[serde(default)]
    pub deploy_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fundamentals,
    Intermediate,
    Advanced,
}

/// Pass/fail outcome for one probe on one repository. `detail` is the
/// audit trail surfaced on the leaderboard and is always populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub detail: String,
}

impl Verdict {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
        }
    }
}

/// A verdict joined with the probe's static metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(rename = "pass")]
    pub passed: bool,
    pub detail: String,
    pub points: u32,
    pub label: String,
    pub category: Category,
    /// `points` if passed, otherwise 0. Folded into `total` on the
    /// published document rather than repeated per probe.
    #[serde(skip)]
    pub awarded: u32,
}

/// Complete set of probe results for one repository in one run.
///
/// `results` keeps registry insertion order and serializes as a JSON
/// object keyed by probe id, in that order.
#[derive(Clone, Debug, Serialize)]
pub struct RepositoryAudit {
    pub team: String,
    pub members: Vec<String>,
    pub repo: String,
    pub deploy_url: Option<String>,
    pub total: u32,
    #[serde(rename = "maxTotal")]
    pub max_total: u32,
    #[serde(serialize_with = "results_as_map")]
    pub results: Vec<(String, ProbeResult)>,
}

impl RepositoryAudit {
    pub fn result(&self, probe_id: &str) -> Option<&ProbeResult> {
        self.results
            .iter()
            .find(|(id, _)| id == probe_id)
            .map(|(_, r)| r)
    }
}

fn results_as_map<S>(results: &[(String, ProbeResult)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(results.len()))?;
    for (id, result) in results {
        map.serialize_entry(id, result)?;
    }
    map.end()
}

#[derive(Clone, Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    #[serde(flatten)]
    pub audit: RepositoryAudit,
}

/// Ranked, aggregated output of one full run.
#[derive(Clone, Debug, Serialize)]
pub struct LeaderboardDocument {
    pub generated_at: String,
    pub total_possible: u32,
    pub teams: Vec<LeaderboardEntry>,
}
