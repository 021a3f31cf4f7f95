//! TheSportsDB event importer
//!
//! Reads `eventsseason` JSON documents saved from TheSportsDB and turns the
//! played events into raw game results.

use crate::{GridironError, RawGameResult, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Highest round number treated as a regular-season or playoff week
const MAX_ROUND_WEEK: u8 = 22;

#[derive(Debug, Deserialize)]
struct EventsDocument {
    #[serde(default)]
    events: Option<Vec<Event>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    id_event: Option<String>,
    str_season: Option<String>,
    date_event: Option<String>,
    str_home_team: Option<String>,
    str_away_team: Option<String>,
    #[serde(default)]
    int_home_score: Value,
    #[serde(default)]
    int_away_score: Value,
    #[serde(default)]
    int_round: Value,
}

/// Scores and rounds arrive as strings, numbers or null
fn parse_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Season from strings like "2023" or "2023-2024"
fn parse_season(value: &str) -> Option<u16> {
    value.split('-').next()?.trim().parse().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Event {
    fn into_result(self, default_season: Option<u16>) -> Option<RawGameResult> {
        let id = self.id_event.clone().unwrap_or_else(|| "?".to_string());

        let (home_team, away_team) =
            match (non_empty(self.str_home_team), non_empty(self.str_away_team)) {
                (Some(home), Some(away)) => (home, away),
                _ => {
                    log::warn!("Skipping event {}: missing team name", id);
                    return None;
                }
            };

        let home_score = parse_number(&self.int_home_score);
        let away_score = parse_number(&self.int_away_score);
        if home_score.is_none() && away_score.is_none() {
            log::debug!("Skipping unplayed event {}", id);
            return None;
        }

        let season = match self
            .str_season
            .as_deref()
            .and_then(parse_season)
            .or(default_season)
        {
            Some(season) => season,
            None => {
                log::warn!("Skipping event {}: no season", id);
                return None;
            }
        };

        let week = parse_number(&self.int_round)
            .and_then(|r| u8::try_from(r).ok())
            .filter(|r| (1..=MAX_ROUND_WEEK).contains(r));

        let date = self
            .date_event
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

        let clamp = |score: Option<u64>| score.unwrap_or(0).min(u16::MAX as u64) as u16;

        Some(RawGameResult {
            season,
            week,
            date,
            home_team,
            away_team,
            home_score: clamp(home_score),
            away_score: clamp(away_score),
            game_key: self.id_event,
        })
    }
}

/// Parse an events document into played game results.
///
/// `default_season` is used for events that carry no season of their own.
pub fn parse_events(json: &str, default_season: Option<u16>) -> Result<Vec<RawGameResult>> {
    let doc: EventsDocument = serde_json::from_str(json)
        .map_err(|e| GridironError::Parse(format!("Invalid events document: {}", e)))?;

    let events = doc.events.unwrap_or_default();
    let total = events.len();
    let games: Vec<RawGameResult> = events
        .into_iter()
        .filter_map(|event| event.into_result(default_season))
        .collect();

    log::info!("Parsed {} played games from {} events", games.len(), total);
    Ok(games)
}

/// Read and parse an events document from disk
pub fn load_events_file<P: AsRef<Path>>(
    path: P,
    default_season: Option<u16>,
) -> Result<Vec<RawGameResult>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_events(&content, default_season)
}
