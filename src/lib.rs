// src/lib.rs

pub mod audit;
pub mod client;
pub mod probes;
pub mod roster;
pub mod scoring;
pub mod types;

// Re-export commonly used items
pub use audit::{audit_roster, run_audit};
pub use client::{GitHubHost, HostError, MockHost, RepoHost};
pub use probes::{Probe, ProbeRegistry, ProbeSpec};
pub use roster::{load_roster, ConfigError};
pub use scoring::build_leaderboard;
pub use types::*;
