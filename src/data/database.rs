//! SQLite store for raw game results

use super::GameSource;
use crate::{RawGameResult, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Raw results database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        // Missing week/date are stored as 0/'' so the uniqueness key holds
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS team_scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                season INTEGER NOT NULL,
                week INTEGER NOT NULL DEFAULT 0,
                date TEXT NOT NULL DEFAULT '',
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                home_score INTEGER NOT NULL,
                away_score INTEGER NOT NULL,
                game_key TEXT,
                UNIQUE(season, week, date, home_team, away_team)
            );

            CREATE INDEX IF NOT EXISTS idx_team_scores_season ON team_scores(season, date);
            "#,
        )?;
        Ok(())
    }

    /// Insert or update a game result
    pub fn upsert_game(&self, game: &RawGameResult) -> Result<()> {
        let date = game
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.conn.execute(
            r#"
            INSERT INTO team_scores (season, week, date, home_team, away_team,
                                     home_score, away_score, game_key)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(season, week, date, home_team, away_team) DO UPDATE SET
                home_score = excluded.home_score,
                away_score = excluded.away_score,
                game_key = COALESCE(excluded.game_key, game_key)
            "#,
            params![
                game.season,
                game.week.unwrap_or(0),
                date,
                game.home_team,
                game.away_team,
                game.home_score,
                game.away_score,
                game.game_key,
            ],
        )?;
        Ok(())
    }

    /// Insert multiple game results
    pub fn upsert_games(&self, games: &[RawGameResult]) -> Result<usize> {
        let mut count = 0;
        for game in games {
            self.upsert_game(game)?;
            count += 1;
        }
        Ok(count)
    }

    /// All games of a season, in date order
    pub fn get_season_games(&self, season: u16) -> Result<Vec<RawGameResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, week, date, home_team, away_team, home_score, away_score, game_key
             FROM team_scores
             WHERE season = ?1
             ORDER BY date, week, id",
        )?;

        let games = stmt
            .query_map(params![season], Self::row_to_game)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// Distinct seasons present, ascending
    pub fn get_seasons(&self) -> Result<Vec<u16>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT season FROM team_scores ORDER BY season")?;
        let seasons = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<u16>, _>>()?;
        Ok(seasons)
    }

    fn row_to_game(row: &rusqlite::Row) -> rusqlite::Result<RawGameResult> {
        let week: u8 = row.get(1)?;
        let date_str: String = row.get(2)?;

        Ok(RawGameResult {
            season: row.get(0)?,
            week: (week > 0).then_some(week),
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").ok(),
            home_team: row.get(3)?,
            away_team: row.get(4)?,
            home_score: row.get(5)?,
            away_score: row.get(6)?,
            game_key: row.get(7)?,
        })
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM team_scores", [], |row| row.get(0))?;

        let min_date: Option<String> = self
            .conn
            .query_row(
                "SELECT MIN(date) FROM team_scores WHERE date != ''",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        let max_date: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(date) FROM team_scores WHERE date != ''",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        Ok(DatabaseStats {
            game_count: game_count as usize,
            seasons: self.get_seasons()?,
            earliest_game: min_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            latest_game: max_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        })
    }
}

impl GameSource for Database {
    fn season_games(&self, season: u16) -> Result<Vec<RawGameResult>> {
        self.get_season_games(season)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub game_count: usize,
    pub seasons: Vec<u16>,
    pub earliest_game: Option<NaiveDate>,
    pub latest_game: Option<NaiveDate>,
}
