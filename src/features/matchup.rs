//! Matchup assembly
//!
//! Pairs per-team feature sets into home/away game records and derives the
//! training labels.

use super::derived::DerivedFeatureSet;
use super::schedule::rest_days;
use crate::{FieldValue, SeasonWeek};

/// Suffix appended to every away-team column
pub const AWAY_SUFFIX: &str = ".1";

/// Combined score above which the over is considered covered
pub const OVER_UNDER_THRESHOLD: f64 = 45.0;

/// Home-field advantage in points attached to every record
pub const HOME_FIELD_ADVANTAGE: f64 = 3.0;

/// Label columns, in output order
pub const LABEL_COLUMNS: [&str; 6] = [
    "Score",
    "Home-Team-Win",
    "OU",
    "OU-Cover",
    "Days-Rest-Home",
    "Days-Rest-Away",
];

/// Provenance columns carried once per record
pub const PROVENANCE_COLUMNS: [&str; 3] = ["Season", "Week", "Date"];

/// One home/away matchup with its labels
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub key: SeasonWeek,
    pub home: DerivedFeatureSet,
    pub away: DerivedFeatureSet,
    /// Combined points of both sides
    pub score: f64,
    /// 1 if the home side outscores the away side
    pub home_team_win: u8,
    /// Over/under line; the combined score stands in for a market line
    pub ou: f64,
    /// 1 if the combined score exceeds the over/under threshold
    pub ou_cover: u8,
    pub days_rest_home: u8,
    pub days_rest_away: u8,
}

impl GameRecord {
    /// Column names in output order
    pub fn column_names() -> Vec<String> {
        let mut names: Vec<String> = DerivedFeatureSet::COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();
        names.extend(PROVENANCE_COLUMNS.iter().map(|c| c.to_string()));
        names.extend(
            DerivedFeatureSet::COLUMNS
                .iter()
                .map(|c| format!("{}{}", c, AWAY_SUFFIX)),
        );
        names.extend(LABEL_COLUMNS.iter().map(|c| c.to_string()));
        names
    }

    /// Values parallel to [`GameRecord::column_names`]
    pub fn values(&self) -> Vec<FieldValue> {
        let mut values = self.home.values();
        values.push(FieldValue::Int(self.key.season as i64));
        values.push(FieldValue::Int(self.key.week as i64));
        values.push(FieldValue::Text(self.key.to_string()));
        values.extend(self.away.values());
        values.push(FieldValue::Real(self.score));
        values.push(FieldValue::Int(self.home_team_win as i64));
        values.push(FieldValue::Real(self.ou));
        values.push(FieldValue::Int(self.ou_cover as i64));
        values.push(FieldValue::Int(self.days_rest_home as i64));
        values.push(FieldValue::Int(self.days_rest_away as i64));
        values
    }

    /// Look up one value by column name
    pub fn get(&self, column: &str) -> Option<FieldValue> {
        Self::column_names()
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values().into_iter().nth(i))
    }

    /// True when no real value is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(FieldValue::is_finite)
    }
}

/// Pairs consecutive teams into games
#[derive(Debug, Clone, Copy)]
pub struct MatchupAssembler {
    pub ou_threshold: f64,
    pub home_field_advantage: f64,
}

impl Default for MatchupAssembler {
    fn default() -> Self {
        MatchupAssembler {
            ou_threshold: OVER_UNDER_THRESHOLD,
            home_field_advantage: HOME_FIELD_ADVANTAGE,
        }
    }
}

impl MatchupAssembler {
    /// Build one record per consecutive pair: item 2i is home, item 2i+1 is
    /// away. A trailing unpaired team is dropped.
    pub fn assemble(&self, key: SeasonWeek, teams: Vec<DerivedFeatureSet>) -> Vec<GameRecord> {
        if teams.len() % 2 == 1 {
            log::debug!(
                "{}: dropping unpaired team {}",
                key,
                teams.last().map(|t| t.team_name.as_str()).unwrap_or("")
            );
        }

        let mut records = Vec::with_capacity(teams.len() / 2);
        let mut teams = teams.into_iter();
        while let (Some(home), Some(away)) = (teams.next(), teams.next()) {
            records.push(self.pair(key, home, away));
        }
        records
    }

    /// Merge one home and one away feature set into a labelled record
    pub fn pair(
        &self,
        key: SeasonWeek,
        mut home: DerivedFeatureSet,
        away: DerivedFeatureSet,
    ) -> GameRecord {
        let score = home.pts + away.pts;
        home.home_advantage = self.home_field_advantage;

        GameRecord {
            key,
            score,
            home_team_win: u8::from(home.pts > away.pts),
            ou: score,
            ou_cover: u8::from(score > self.ou_threshold),
            days_rest_home: rest_days(key.week, home.prior_games),
            days_rest_away: rest_days(key.week, away.prior_games),
            home,
            away,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::synthetic::SyntheticStatsGenerator;
    use crate::features::team_stats::TeamCumulativeStats;
    use std::collections::HashSet;

    fn team(name: &str, pts: f64, prior_games: u32) -> DerivedFeatureSet {
        DerivedFeatureSet::from_stats(&TeamCumulativeStats {
            team_name: name.to_string(),
            gp: prior_games + 1,
            prior_games,
            pts,
            ..TeamCumulativeStats::default()
        })
    }

    fn synthetic_week(key: SeasonWeek) -> Vec<DerivedFeatureSet> {
        SyntheticStatsGenerator::default()
            .generate(key)
            .iter()
            .map(DerivedFeatureSet::from_stats)
            .collect()
    }

    #[test]
    fn test_labels() {
        let key = SeasonWeek::new(2023, 1);
        let record = MatchupAssembler::default().pair(key, team("A", 28.0, 1), team("B", 24.0, 1));

        assert_eq!(record.score, 52.0);
        assert_eq!(record.home_team_win, 1);
        assert_eq!(record.ou, 52.0);
        assert_eq!(record.ou_cover, 1);
        assert_eq!(record.home.home_advantage, HOME_FIELD_ADVANTAGE);
        assert_eq!(record.away.home_advantage, 0.0);
    }

    #[test]
    fn test_tie_and_low_total() {
        let key = SeasonWeek::new(2023, 1);
        let record = MatchupAssembler::default().pair(key, team("A", 20.0, 1), team("B", 20.0, 1));

        assert_eq!(record.home_team_win, 0);
        assert_eq!(record.ou_cover, 0);

        let exact = MatchupAssembler::default().pair(key, team("A", 22.5, 1), team("B", 22.5, 1));
        assert_eq!(exact.ou_cover, 0);
    }

    #[test]
    fn test_rest_days() {
        let key = SeasonWeek::new(2023, 5);
        let record = MatchupAssembler::default().pair(key, team("A", 20.0, 3), team("B", 20.0, 4));

        assert_eq!(record.days_rest_home, 14);
        assert_eq!(record.days_rest_away, 7);
    }

    #[test]
    fn test_full_week_pairing() {
        let key = SeasonWeek::new(2024, 6);
        let records = MatchupAssembler::default().assemble(key, synthetic_week(key));

        assert_eq!(records.len(), 16);
        let mut seen = HashSet::new();
        for record in &records {
            assert_ne!(record.home.team_name, record.away.team_name);
            assert!(seen.insert(record.home.team_name.clone()));
            assert!(seen.insert(record.away.team_name.clone()));
            assert!(record.is_finite());
        }
        assert_eq!(records[0].home.team_name, "Kansas City Chiefs");
        assert_eq!(records[0].away.team_name, "Buffalo Bills");
    }

    #[test]
    fn test_odd_team_dropped() {
        let key = SeasonWeek::new(2023, 2);
        let teams = vec![team("A", 1.0, 1), team("B", 2.0, 1), team("C", 3.0, 1)];
        let records = MatchupAssembler::default().assemble(key, teams);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].home.team_name, "A");
        assert_eq!(records[0].away.team_name, "B");
    }

    #[test]
    fn test_column_layout() {
        let names = GameRecord::column_names();
        let key = SeasonWeek::new(2023, 3);
        let record = MatchupAssembler::default().pair(key, team("A", 28.0, 2), team("B", 24.0, 2));

        assert_eq!(names.len(), record.values().len());
        assert_eq!(names.len(), 2 * DerivedFeatureSet::DIM + 3 + 6);

        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        for column in DerivedFeatureSet::COLUMNS {
            assert!(names.contains(&format!("{}.1", column)));
        }
        for column in ["Season.1", "Week.1", "Date.1"] {
            assert!(!names.contains(&column.to_string()));
        }

        assert_eq!(record.get("Date"), Some(FieldValue::Text("2023-W03".to_string())));
        assert_eq!(record.get("PTS"), Some(FieldValue::Real(28.0)));
        assert_eq!(record.get("PTS.1"), Some(FieldValue::Real(24.0)));
        assert_eq!(record.get("TEAM_NAME.1"), Some(FieldValue::Text("B".to_string())));
        assert_eq!(record.get("Home-Team-Win"), Some(FieldValue::Int(1)));
        assert_eq!(record.get("HOME_ADVANTAGE"), Some(FieldValue::Real(3.0)));
        assert_eq!(record.get("HOME_ADVANTAGE.1"), Some(FieldValue::Real(0.0)));
    }

    #[test]
    fn test_synthetic_round_trip_labels_present() {
        for week in 1..=18 {
            let key = SeasonWeek::new(2022, week);
            let records = MatchupAssembler::default().assemble(key, synthetic_week(key));
            assert_eq!(records.len(), 16);
            for record in &records {
                for label in LABEL_COLUMNS {
                    assert!(record.get(label).is_some());
                }
            }
        }
    }
}
