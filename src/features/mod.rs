//! Feature derivation and matchup assembly
//!
//! Converts raw game results into per-team features and labelled matchups.

pub mod derived;
pub mod matchup;
pub mod schedule;
pub mod synthetic;
pub mod team_stats;

pub use derived::DerivedFeatureSet;
pub use matchup::{GameRecord, MatchupAssembler};
pub use synthetic::SyntheticStatsGenerator;
pub use team_stats::{StatAggregator, TeamCumulativeStats};
