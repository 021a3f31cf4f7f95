//! NFL matchup dataset builder
//!
//! Turns raw per-game results into one feature row per matchup, ready to be
//! consumed by model training.

pub mod data;
pub mod features;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Fixed 32-team roster, in the order the synthetic generator indexes it
pub const NFL_TEAMS: [&str; 32] = [
    "Kansas City Chiefs",
    "Buffalo Bills",
    "Cincinnati Bengals",
    "Tennessee Titans",
    "Indianapolis Colts",
    "Houston Texans",
    "Jacksonville Jaguars",
    "Denver Broncos",
    "Las Vegas Raiders",
    "Los Angeles Chargers",
    "Pittsburgh Steelers",
    "Baltimore Ravens",
    "Cleveland Browns",
    "New England Patriots",
    "Miami Dolphins",
    "New York Jets",
    "Dallas Cowboys",
    "Philadelphia Eagles",
    "New York Giants",
    "Washington Commanders",
    "Green Bay Packers",
    "Minnesota Vikings",
    "Chicago Bears",
    "Detroit Lions",
    "Tampa Bay Buccaneers",
    "New Orleans Saints",
    "Atlanta Falcons",
    "Carolina Panthers",
    "San Francisco 49ers",
    "Seattle Seahawks",
    "Los Angeles Rams",
    "Arizona Cardinals",
];

/// Key identifying one week of one season
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeasonWeek {
    pub season: u16,
    pub week: u8,
}

impl SeasonWeek {
    pub fn new(season: u16, week: u8) -> Self {
        SeasonWeek { season, week }
    }
}

impl fmt::Display for SeasonWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.season, self.week)
    }
}

/// A single game result from the historical results store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGameResult {
    pub season: u16,
    /// Week number if the source recorded one
    pub week: Option<u8>,
    pub date: Option<NaiveDate>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u16,
    pub away_score: u16,
    /// Identifier assigned by the upstream source, if any
    pub game_key: Option<String>,
}

impl RawGameResult {
    /// Week this game belongs to: the recorded week, else derived from the date
    pub fn resolved_week(&self) -> Option<u8> {
        self.week.or_else(|| {
            self.date
                .map(|date| features::schedule::week_of_date(self.season, date))
        })
    }
}

/// One cell of the output table
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// SQLite column affinity for this value
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "INTEGER",
            FieldValue::Real(_) => "REAL",
            FieldValue::Text(_) => "TEXT",
        }
    }

    /// False for NaN or infinite reals
    pub fn is_finite(&self) -> bool {
        match self {
            FieldValue::Real(v) => v.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum GridironError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No games produced for seasons {seasons:?}; check raw results availability")]
    NothingProduced { seasons: Vec<u16> },
}

pub type Result<T> = std::result::Result<T, GridironError>;

/// What the dataset builder does for a week with no real results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Substitute deterministic synthetic statistics for the whole roster
    #[default]
    Synthetic,
    /// Produce no games for that week
    Skip,
}

/// Inclusive week bounds for one season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    #[serde(default = "default_start_week")]
    pub start_week: u8,
    #[serde(default = "default_end_week")]
    pub end_week: u8,
}

fn default_start_week() -> u8 {
    1
}

fn default_end_week() -> u8 {
    features::schedule::REGULAR_SEASON_WEEKS
}

impl Default for WeekRange {
    fn default() -> Self {
        WeekRange {
            start_week: default_start_week(),
            end_week: default_end_week(),
        }
    }
}

impl WeekRange {
    pub fn weeks(&self) -> std::ops::RangeInclusive<u8> {
        self.start_week..=self.end_week
    }

    fn validate(&self, season: &str) -> Result<()> {
        if self.start_week == 0 || self.start_week > self.end_week {
            return Err(GridironError::Config(format!(
                "Invalid week range for season {}: {}..={}",
                season, self.start_week, self.end_week
            )));
        }
        Ok(())
    }
}

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub build: BuildConfig,
    /// Per-season week bounds, keyed by season year
    #[serde(rename = "create-nfl-games", default)]
    pub seasons: BTreeMap<String, WeekRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub results_path: String,
    pub dataset_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

/// Seasons built when the config names none
pub const DEFAULT_SEASONS: [u16; 6] = [2019, 2020, 2021, 2022, 2023, 2024];

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                results_path: "Data/NFLTeamData.sqlite".to_string(),
                dataset_path: "Data/NFLDataset.sqlite".to_string(),
            },
            build: BuildConfig::default(),
            seasons: DEFAULT_SEASONS
                .iter()
                .map(|s| (s.to_string(), WeekRange::default()))
                .collect(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridironError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GridironError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GridironError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Seasons to build with their week bounds, in ascending season order.
    ///
    /// Keys that are not all digits are ignored. An empty section falls back
    /// to [`DEFAULT_SEASONS`] with the full regular season.
    pub fn season_plan(&self) -> Result<Vec<(u16, WeekRange)>> {
        let mut plan = Vec::new();
        for (key, range) in &self.seasons {
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_digit()) {
                log::debug!("Ignoring non-season key '{}' in season config", key);
                continue;
            }
            let season: u16 = key
                .parse()
                .map_err(|_| GridironError::Config(format!("Season out of range: {}", key)))?;
            range.validate(key)?;
            plan.push((season, *range));
        }

        if plan.is_empty() {
            plan = DEFAULT_SEASONS
                .iter()
                .map(|s| (*s, WeekRange::default()))
                .collect();
        }

        plan.sort_by_key(|(season, _)| *season);
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_week_display() {
        assert_eq!(SeasonWeek::new(2023, 5).to_string(), "2023-W05");
        assert_eq!(SeasonWeek::new(2019, 17).to_string(), "2019-W17");
    }

    #[test]
    fn test_default_plan() {
        let config = Config {
            seasons: BTreeMap::new(),
            ..Config::default()
        };
        let plan = config.season_plan().unwrap();
        assert_eq!(plan.len(), DEFAULT_SEASONS.len());
        assert_eq!(plan[0], (2019, WeekRange::default()));
        assert_eq!(plan[0].1.weeks(), 1..=18);
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml(
            r#"
            [data]
            results_path = "r.sqlite"
            dataset_path = "d.sqlite"

            [build]
            fallback = "skip"

            [create-nfl-games.2023]
            start_week = 3
            end_week = 5

            [create-nfl-games.2021]
            end_week = 2

            [create-nfl-games.notes]
            "#,
        )
        .unwrap();

        assert_eq!(config.build.fallback, FallbackPolicy::Skip);
        let plan = config.season_plan().unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].0, 2021);
        assert_eq!(plan[0].1.weeks(), 1..=2);
        assert_eq!(plan[1].0, 2023);
        assert_eq!(plan[1].1.weeks(), 3..=5);
    }

    #[test]
    fn test_invalid_week_range() {
        let mut config = Config::default();
        config.seasons.insert(
            "2022".to_string(),
            WeekRange {
                start_week: 6,
                end_week: 2,
            },
        );
        assert!(matches!(
            config.season_plan(),
            Err(GridironError::Config(_))
        ));
    }

    #[test]
    fn test_resolved_week() {
        let mut game = RawGameResult {
            season: 2023,
            week: Some(4),
            date: NaiveDate::from_ymd_opt(2023, 9, 20),
            home_team: "Detroit Lions".to_string(),
            away_team: "Chicago Bears".to_string(),
            home_score: 20,
            away_score: 17,
            game_key: None,
        };
        assert_eq!(game.resolved_week(), Some(4));

        game.week = None;
        assert_eq!(game.resolved_week(), Some(3));

        game.date = None;
        assert_eq!(game.resolved_week(), None);
    }
}
