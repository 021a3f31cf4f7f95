//! Training dataset assembly
//!
//! Walks every configured season and week, turning raw results into
//! labelled matchup rows.

use super::store::{DatasetStore, PersistSummary};
use super::GameSource;
use crate::features::{
    DerivedFeatureSet, GameRecord, MatchupAssembler, StatAggregator, SyntheticStatsGenerator,
    TeamCumulativeStats,
};
use crate::{
    Config, FallbackPolicy, FieldValue, GridironError, RawGameResult, Result, SeasonWeek,
    WeekRange,
};
use std::io::Write;

/// Ordered collection of matchup rows for one or more seasons
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<GameRecord>,
}

impl Dataset {
    pub fn new(records: Vec<GameRecord>) -> Self {
        Dataset { records }
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Column names shared by every row
    pub fn column_names(&self) -> Vec<String> {
        GameRecord::column_names()
    }

    /// Distinct seasons present, ascending
    pub fn seasons(&self) -> Vec<u16> {
        let mut seasons: Vec<u16> = self.records.iter().map(|r| r.key.season).collect();
        seasons.sort_unstable();
        seasons.dedup();
        seasons
    }

    /// Rows belonging to one season/week
    pub fn week(&self, key: SeasonWeek) -> impl Iterator<Item = &GameRecord> {
        self.records.iter().filter(move |r| r.key == key)
    }

    /// Write the dataset as CSV with a header row
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        let header: Vec<String> = self
            .column_names()
            .iter()
            .map(|c| csv_field(c))
            .collect();
        writeln!(writer, "{}", header.join(","))?;

        for record in &self.records {
            let row: Vec<String> = record
                .values()
                .iter()
                .map(|v| match v {
                    FieldValue::Text(s) => csv_field(s),
                    other => other.to_string(),
                })
                .collect();
            writeln!(writer, "{}", row.join(","))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Builds the matchup dataset from a raw results source
pub struct DatasetBuilder<'a, S: GameSource + ?Sized> {
    source: &'a S,
    plan: Vec<(u16, WeekRange)>,
    fallback: FallbackPolicy,
    synthetic: SyntheticStatsGenerator,
    assembler: MatchupAssembler,
}

impl<'a, S: GameSource + ?Sized> DatasetBuilder<'a, S> {
    /// Create a builder over explicit (season, weeks) pairs
    pub fn new(source: &'a S, plan: Vec<(u16, WeekRange)>) -> Self {
        DatasetBuilder {
            source,
            plan,
            fallback: FallbackPolicy::default(),
            synthetic: SyntheticStatsGenerator::default(),
            assembler: MatchupAssembler::default(),
        }
    }

    /// Create a builder from the season plan and fallback policy in `config`
    pub fn from_config(source: &'a S, config: &Config) -> Result<Self> {
        Ok(Self::new(source, config.season_plan()?).with_fallback(config.build.fallback))
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_synthetic(mut self, synthetic: SyntheticStatsGenerator) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// Restrict the build to `seasons`. Seasons missing from the plan get the
    /// full regular season.
    pub fn with_seasons(mut self, seasons: &[u16]) -> Self {
        if seasons.is_empty() {
            return self;
        }
        let mut plan: Vec<(u16, WeekRange)> = seasons
            .iter()
            .map(|season| {
                let range = self
                    .plan
                    .iter()
                    .find(|(s, _)| s == season)
                    .map(|(_, r)| *r)
                    .unwrap_or_default();
                (*season, range)
            })
            .collect();
        plan.sort_by_key(|(season, _)| *season);
        plan.dedup_by_key(|(season, _)| *season);
        self.plan = plan;
        self
    }

    /// Seasons this builder will process
    pub fn seasons(&self) -> Vec<u16> {
        self.plan.iter().map(|(season, _)| *season).collect()
    }

    /// Team statistics for one week, with the fallback policy applied when the
    /// raw results have nothing up to that week.
    pub fn team_stats(&self, key: SeasonWeek, games: &[RawGameResult]) -> Vec<TeamCumulativeStats> {
        let stats = StatAggregator::aggregate(games, key.season, key.week);
        if !stats.is_empty() {
            log::debug!("{}: aggregated {} teams from game results", key, stats.len());
            return stats;
        }

        match self.fallback {
            FallbackPolicy::Synthetic => {
                log::warn!("{}: no game data found, using synthetic statistics", key);
                self.synthetic.generate(key)
            }
            FallbackPolicy::Skip => {
                log::warn!("{}: no game data found, skipping week", key);
                Vec::new()
            }
        }
    }

    /// Matchup rows for one week
    pub fn build_week(&self, key: SeasonWeek, games: &[RawGameResult]) -> Vec<GameRecord> {
        let features: Vec<DerivedFeatureSet> = self
            .team_stats(key, games)
            .iter()
            .map(DerivedFeatureSet::from_stats)
            .collect();
        self.assembler.assemble(key, features)
    }

    /// Build the full dataset in memory.
    ///
    /// Fails with [`GridironError::NothingProduced`] when no week yields a
    /// single game.
    pub fn build(&self) -> Result<Dataset> {
        let mut records = Vec::new();

        for (season, range) in &self.plan {
            log::info!(
                "Processing {} season, weeks {}-{}",
                season,
                range.start_week,
                range.end_week
            );
            let games = self.source.season_games(*season)?;
            log::debug!("{}: {} raw games", season, games.len());

            for week in range.weeks() {
                let key = SeasonWeek::new(*season, week);
                let week_records = self.build_week(key, &games);
                if !week_records.is_empty() {
                    log::info!("{}: added {} games", key, week_records.len());
                }
                records.extend(week_records);
            }
        }

        if records.is_empty() {
            return Err(GridironError::NothingProduced {
                seasons: self.seasons(),
            });
        }

        let dataset = Dataset::new(records);
        debug_assert!(dataset.records().iter().all(GameRecord::is_finite));
        Ok(dataset)
    }

    /// Build the dataset and replace the stored table for the planned seasons
    pub fn run(&self, store: &mut DatasetStore) -> Result<PersistSummary> {
        let dataset = self.build()?;
        store.replace(&dataset, &self.seasons())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matchup::LABEL_COLUMNS;

    fn game(season: u16, week: u8, home: &str, away: &str, home_score: u16, away_score: u16) -> RawGameResult {
        RawGameResult {
            season,
            week: Some(week),
            date: None,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score,
            away_score,
            game_key: None,
        }
    }

    fn weeks(start_week: u8, end_week: u8) -> WeekRange {
        WeekRange {
            start_week,
            end_week,
        }
    }

    #[test]
    fn test_synthetic_fallback_fills_every_week() {
        let source: Vec<RawGameResult> = Vec::new();
        let dataset = DatasetBuilder::new(&source, vec![(2020, weeks(1, 3))])
            .build()
            .unwrap();

        assert_eq!(dataset.len(), 48);
        assert_eq!(dataset.seasons(), vec![2020]);
        assert_eq!(dataset.week(SeasonWeek::new(2020, 2)).count(), 16);
        for record in dataset.records() {
            assert!(record.is_finite());
            for label in LABEL_COLUMNS {
                assert!(record.get(label).is_some());
            }
        }
    }

    #[test]
    fn test_empty_source_without_fallback() {
        let source: Vec<RawGameResult> = Vec::new();
        let result = DatasetBuilder::new(&source, vec![(2020, weeks(1, 2)), (2021, weeks(1, 2))])
            .with_fallback(FallbackPolicy::Skip)
            .build();

        match result {
            Err(GridironError::NothingProduced { seasons }) => assert_eq!(seasons, vec![2020, 2021]),
            other => panic!("expected NothingProduced, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_real_data_preferred() {
        let source = vec![
            game(2023, 1, "Bills", "Jets", 30, 20),
            game(2023, 1, "Chiefs", "Lions", 20, 21),
        ];
        let dataset = DatasetBuilder::new(&source, vec![(2023, weeks(1, 1))])
            .build()
            .unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.records()[0];
        assert_eq!(first.home.team_name, "Bills");
        assert_eq!(first.away.team_name, "Jets");
        assert_eq!(first.score, 50.0);
        assert_eq!(first.home_team_win, 1);
        assert_eq!(first.ou_cover, 1);
        assert_eq!(dataset.records()[1].home_team_win, 0);
    }

    #[test]
    fn test_fallback_only_for_missing_weeks() {
        // Real data starts in week 2, so week 1 falls back
        let source = vec![game(2023, 2, "Bills", "Jets", 30, 20)];
        let dataset = DatasetBuilder::new(&source, vec![(2023, weeks(1, 2))])
            .build()
            .unwrap();

        assert_eq!(dataset.week(SeasonWeek::new(2023, 1)).count(), 16);
        assert_eq!(dataset.week(SeasonWeek::new(2023, 2)).count(), 1);
    }

    #[test]
    fn test_rest_days_from_games_played() {
        let source = vec![
            game(2023, 1, "Bills", "Jets", 30, 20),
            game(2023, 2, "Bills", "Jets", 30, 20),
            game(2023, 3, "Bills", "Dolphins", 30, 20),
            game(2023, 3, "Jets", "Patriots", 17, 3),
        ];
        let dataset = DatasetBuilder::new(&source, vec![(2023, weeks(4, 4))])
            .build()
            .unwrap();

        // Cutoff week 4: Dolphins and Patriots have 1 game (< 3) each
        let second = &dataset.records()[1];
        assert_eq!(second.home.team_name, "Dolphins");
        assert_eq!(second.days_rest_home, 14);
        assert_eq!(second.days_rest_away, 14);
        assert_eq!(dataset.records()[0].days_rest_home, 7);
    }

    #[test]
    fn test_bye_week_rest_days() {
        // Bills/Jets are off in week 2, Dolphins/Patriots play every week
        let mut source = Vec::new();
        for week in 1..=5 {
            if week != 2 {
                source.push(game(2023, week, "Bills", "Jets", 24, 20));
            }
            source.push(game(2023, week, "Dolphins", "Patriots", 27, 13));
        }
        let dataset = DatasetBuilder::new(&source, vec![(2023, weeks(5, 5))])
            .build()
            .unwrap();

        let bye = &dataset.records()[0];
        assert_eq!(bye.home.team_name, "Bills");
        assert_eq!(bye.home.gp, 4);
        assert_eq!(bye.days_rest_home, 14);
        assert_eq!(bye.days_rest_away, 14);

        let regular = &dataset.records()[1];
        assert_eq!(regular.home.team_name, "Dolphins");
        assert_eq!(regular.home.gp, 5);
        assert_eq!(regular.days_rest_home, 7);
        assert_eq!(regular.days_rest_away, 7);
    }

    #[test]
    fn test_run_names_table_after_planned_seasons() {
        let source = vec![
            game(2023, 1, "Bills", "Jets", 30, 20),
            game(2023, 1, "Chiefs", "Lions", 20, 21),
        ];
        let mut store = DatasetStore::in_memory().unwrap();
        let summary = DatasetBuilder::new(
            &source,
            vec![(2019, weeks(1, 1)), (2023, weeks(1, 1)), (2024, weeks(1, 1))],
        )
        .with_fallback(FallbackPolicy::Skip)
        .run(&mut store)
        .unwrap();

        assert_eq!(summary.table, "nfl_dataset_2019-2024");
        assert_eq!(summary.rows, 2);
    }

    #[test]
    fn test_write_csv_flush_error_surfaces() {
        struct FailingFlush(Vec<u8>);

        impl Write for FailingFlush {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
        }

        let source: Vec<RawGameResult> = Vec::new();
        let dataset = DatasetBuilder::new(&source, vec![(2020, weeks(1, 1))])
            .build()
            .unwrap();

        let result = dataset.write_csv(FailingFlush(Vec::new()));
        assert!(matches!(result, Err(GridironError::Io(_))));
    }

    #[test]
    fn test_with_seasons() {
        let source: Vec<RawGameResult> = Vec::new();
        let builder = DatasetBuilder::new(&source, vec![(2020, weeks(2, 3)), (2021, weeks(1, 1))])
            .with_seasons(&[2022, 2020]);

        assert_eq!(builder.seasons(), vec![2020, 2022]);
        let dataset = builder.build().unwrap();
        assert_eq!(dataset.len(), 2 * 16 + 18 * 16);
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_toml(
            r#"
            [data]
            results_path = "r.sqlite"
            dataset_path = "d.sqlite"

            [build]
            fallback = "skip"

            [create-nfl-games.2019]
            start_week = 1
            end_week = 1
            "#,
        )
        .unwrap();
        let source: Vec<RawGameResult> = Vec::new();
        let builder = DatasetBuilder::from_config(&source, &config).unwrap();

        assert_eq!(builder.seasons(), vec![2019]);
        assert!(matches!(builder.build(), Err(GridironError::NothingProduced { .. })));
    }

    #[test]
    fn test_custom_synthetic_roster() {
        let source: Vec<RawGameResult> = Vec::new();
        let roster = ["North", "South", "East"];
        let dataset = DatasetBuilder::new(&source, vec![(2020, weeks(1, 2))])
            .with_synthetic(SyntheticStatsGenerator::new(&roster))
            .build()
            .unwrap();

        // Odd roster leaves the last team unpaired each week
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].home.team_name, "North");
        assert_eq!(dataset.records()[0].away.team_name, "South");
    }

    #[test]
    fn test_run_persists() {
        let source = vec![
            game(2023, 1, "Bills", "Jets", 30, 20),
            game(2023, 1, "Chiefs", "Lions", 20, 21),
        ];
        let mut store = DatasetStore::in_memory().unwrap();
        let summary = DatasetBuilder::new(&source, vec![(2023, weeks(1, 1))])
            .run(&mut store)
            .unwrap();

        assert_eq!(summary.table, "nfl_dataset_2023-2023");
        assert_eq!(summary.rows, 2);
        assert_eq!(store.describe_table(&summary.table).unwrap().row_count, 2);
    }

    #[test]
    fn test_run_nothing_produced_leaves_store_untouched() {
        let source: Vec<RawGameResult> = Vec::new();
        let mut store = DatasetStore::in_memory().unwrap();
        let result = DatasetBuilder::new(&source, vec![(2023, weeks(1, 1))])
            .with_fallback(FallbackPolicy::Skip)
            .run(&mut store);

        assert!(matches!(result, Err(GridironError::NothingProduced { .. })));
        assert!(store.tables().unwrap().is_empty());
    }

    #[test]
    fn test_write_csv() {
        let source: Vec<RawGameResult> = Vec::new();
        let dataset = DatasetBuilder::new(&source, vec![(2020, weeks(1, 1))])
            .build()
            .unwrap();

        let mut out = Vec::new();
        dataset.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 17);
        assert!(lines[0].starts_with("TEAM_NAME,GP,W,L"));
        assert!(lines[0].ends_with("Days-Rest-Home,Days-Rest-Away"));
        assert!(lines[1].starts_with("Kansas City Chiefs,1,"));
        assert_eq!(
            lines[1].split(',').count(),
            dataset.column_names().len()
        );
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
