//! Season calendar helpers
//!
//! Week numbering is anchored at September 1 of the season year with
//! seven-day weeks, matching how the results and odds feeds label games.

use chrono::{Datelike, NaiveDate};

/// Weeks in an NFL regular season
pub const REGULAR_SEASON_WEEKS: u8 = 18;

/// Rest days assumed between consecutive weekly games
pub const STANDARD_REST_DAYS: u8 = 7;

/// Rest days assumed after a bye
pub const BYE_REST_DAYS: u8 = 14;

fn season_start(season: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(season, 9, 1).unwrap_or(NaiveDate::MIN)
}

/// Week of `season` a date falls in, clamped to the regular season
pub fn week_of_date(season: u16, date: NaiveDate) -> u8 {
    let days = (date - season_start(season as i32)).num_days();
    (days.div_euclid(7) + 1).clamp(1, REGULAR_SEASON_WEEKS as i64) as u8
}

/// Week of the season in progress on `today`.
///
/// Months before September belong to the previous calendar year's season.
pub fn current_week(today: NaiveDate) -> u8 {
    let season = if today.month() >= 9 {
        today.year()
    } else {
        today.year() - 1
    };
    let days = (today - season_start(season)).num_days();
    (days.div_euclid(7) + 1).clamp(1, REGULAR_SEASON_WEEKS as i64) as u8
}

/// Rest days before `week` for a team that played `prior_games` games in
/// earlier weeks.
///
/// A team whose prior games trail the weeks already elapsed is presumed to
/// be coming off a bye.
pub fn rest_days(week: u8, prior_games: i64) -> u8 {
    if week > 1 && prior_games < (week as i64 - 1) {
        BYE_REST_DAYS
    } else {
        STANDARD_REST_DAYS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_of_date() {
        assert_eq!(week_of_date(2023, date(2023, 9, 1)), 1);
        assert_eq!(week_of_date(2023, date(2023, 9, 7)), 1);
        assert_eq!(week_of_date(2023, date(2023, 9, 8)), 2);
        assert_eq!(week_of_date(2023, date(2023, 10, 15)), 7);
    }

    #[test]
    fn test_week_of_date_clamped() {
        // Preseason and playoff dates stay inside the regular season
        assert_eq!(week_of_date(2023, date(2023, 8, 10)), 1);
        assert_eq!(week_of_date(2023, date(2024, 2, 11)), REGULAR_SEASON_WEEKS);
    }

    #[test]
    fn test_current_week() {
        assert_eq!(current_week(date(2024, 9, 10)), 2);
        assert_eq!(current_week(date(2025, 1, 5)), REGULAR_SEASON_WEEKS);
        assert_eq!(current_week(date(2024, 6, 1)), REGULAR_SEASON_WEEKS);
    }

    #[test]
    fn test_rest_days() {
        assert_eq!(rest_days(1, 0), STANDARD_REST_DAYS);
        assert_eq!(rest_days(5, 3), BYE_REST_DAYS);
        assert_eq!(rest_days(5, 4), STANDARD_REST_DAYS);
        assert_eq!(rest_days(5, 5), STANDARD_REST_DAYS);
    }
}
