// src/scoring/aggregator.rs

use chrono::{SecondsFormat, Utc};

use crate::types::{LeaderboardDocument, LeaderboardEntry, RepositoryAudit};

/// Sorts audits by total descending and assigns 1-based ranks.
///
/// The sort is stable, so tied totals keep their roster order and get
/// distinct consecutive ranks rather than a shared rank. Performs no
/// I/O; `generated_at` is the only nondeterministic field.
pub fn build_leaderboard(
    audits: Vec<RepositoryAudit>,
    total_possible: u32,
) -> LeaderboardDocument {
    let mut sorted = audits;
    sorted.sort_by(|a, b| b.total.cmp(&a.total));

    let teams = sorted
        .into_iter()
        .enumerate()
        .map(|(index, audit)| LeaderboardEntry {
            rank: index as u32 + 1,
            audit,
        })
        .collect();

    LeaderboardDocument {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        total_possible,
        teams,
    }
}
