// src/scoring/mod.rs

pub mod aggregator;

pub use aggregator::build_leaderboard;
