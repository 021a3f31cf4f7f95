//! Deterministic stand-in statistics
//!
//! Used when a season/week has no real results so that every week still
//! yields a complete, pairable set of teams. Values depend only on the
//! team's roster position and the week number.

use super::team_stats::{StatRanks, TeamCumulativeStats};
use crate::{SeasonWeek, NFL_TEAMS};

/// Generates plausible statistics for a fixed roster
#[derive(Debug, Clone)]
pub struct SyntheticStatsGenerator {
    roster: Vec<String>,
}

impl SyntheticStatsGenerator {
    pub fn new<S: AsRef<str>>(roster: &[S]) -> Self {
        SyntheticStatsGenerator {
            roster: roster.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// One record per roster team, in roster order
    pub fn generate(&self, key: SeasonWeek) -> Vec<TeamCumulativeStats> {
        self.roster
            .iter()
            .enumerate()
            .map(|(i, name)| team_stats(name, i as u32, key.week as u32))
            .collect()
    }
}

impl Default for SyntheticStatsGenerator {
    fn default() -> Self {
        Self::new(&NFL_TEAMS)
    }
}

fn team_stats(name: &str, i: u32, week: u32) -> TeamCumulativeStats {
    let wins = (week + i % 3).saturating_sub(2);
    let losses = week - wins;

    let fgm = (25 + i % 10) as f64;
    let fga = (40 + i % 15) as f64;
    let ftm = (3 + i % 3) as f64;
    let fta = (5 + i % 2) as f64;

    TeamCumulativeStats {
        team_name: name.to_string(),
        gp: week,
        prior_games: week.saturating_sub(1),
        w: wins,
        l: losses,
        w_pct: wins as f64 / week.max(1) as f64,
        pts: (24 + i % 12) as f64,
        plus_minus: (i % 21) as f64 - 10.0,
        min: Some(60.0),
        fgm,
        fga,
        fg_pct: fgm / fga,
        fg3m: (120 + i % 30) as f64,
        fg3a: (25 + i % 8) as f64,
        fg3_pct: 4.8 + (i % 2) as f64,
        ftm,
        fta,
        ft_pct: ftm / fta,
        oreb: (80 + i % 20) as f64,
        dreb: (200 + i % 50) as f64,
        reb: (280 + i % 70) as f64,
        ast: (12 + i % 6) as f64,
        tov: (1 + i % 3) as f64,
        stl: (1 + i % 3) as f64,
        blk: (2 + i % 2) as f64,
        blka: (2 + i % 2) as f64,
        pf: (6 + i % 4) as f64,
        pfd: (5 + i % 3) as f64,
        ranks: StatRanks::uniform((i % 32 + 1) as u8),
    }
}
