//! Football feature derivation
//!
//! Maps one team's cumulative box-score statistics onto football-oriented
//! features. Many of the yardage and special-teams values are scaled
//! estimates of the underlying counters, not measured quantities.

use super::team_stats::TeamCumulativeStats;
use crate::FieldValue;

/// Possession minutes assumed when the source does not report them
pub const DEFAULT_POSSESSION_MINUTES: f64 = 48.0;

/// Regulation game length in minutes
pub const GAME_MINUTES: f64 = 60.0;

const MAX_RANK: i64 = 32;

/// Number of output columns per team
pub const FEATURE_COUNT: usize = 72;

/// One team's derived features, in output column order
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatureSet {
    pub team_name: String,
    pub gp: i64,
    /// Games before the current week; not an output column
    pub prior_games: i64,
    pub w: i64,
    pub l: i64,
    pub w_pct: f64,
    pub pts: f64,
    pub pts_rank: i64,

    // Passing
    pub pass_yds: f64,
    pub pass_att: f64,
    pub pass_pct: f64,
    pub pass_yds_rank: i64,
    pub pass_pct_rank: i64,

    // Rushing
    pub rush_yds: f64,
    pub rush_att: f64,
    pub rush_avg: f64,
    pub rush_yds_rank: i64,
    pub rush_avg_rank: i64,

    // Red zone
    pub rz_td_pct: f64,
    pub rz_att: f64,
    pub rz_td: f64,
    pub rz_td_pct_rank: i64,

    // Third down
    pub third_down_pct: f64,
    pub third_down_att: f64,
    pub third_down_conv: f64,
    pub third_down_pct_rank: i64,

    // Turnovers
    pub turnovers: f64,
    pub takeaways: f64,
    pub turnover_diff: f64,
    pub turnovers_rank: i64,
    pub takeaways_rank: i64,

    // Defense
    pub pts_allowed: f64,
    pub pts_allowed_rank: i64,
    pub pass_yds_allowed: f64,
    pub rush_yds_allowed: f64,
    pub total_yds_allowed: f64,
    pub pass_yds_allowed_rank: i64,
    pub rush_yds_allowed_rank: i64,
    pub sacks: f64,
    pub sacks_allowed: f64,
    pub sack_diff: f64,
    pub sacks_rank: i64,
    pub third_down_def_pct: f64,
    pub third_down_def_rank: i64,

    // Special teams
    pub fg_pct: f64,
    pub fg_made: f64,
    pub fg_att: f64,
    pub fg_pct_rank: i64,
    pub punt_ret_avg: f64,
    pub kick_ret_avg: f64,
    pub punt_ret_td: f64,
    pub kick_ret_td: f64,
    pub st_pts: f64,
    pub st_pts_rank: i64,

    // Game context
    pub time_poss: f64,
    pub time_poss_pct: f64,
    pub time_poss_rank: i64,
    pub penalties: f64,
    pub penalty_yds: f64,
    pub penalties_rank: i64,
    /// Zero per team; the matchup assembler sets it for the home side
    pub home_advantage: f64,
    pub weather_impact: f64,
    pub injury_impact: f64,

    // Efficiency
    pub off_efficiency: f64,
    pub red_zone_efficiency: f64,
    pub third_down_efficiency: f64,
    pub def_efficiency: f64,
    pub pass_def_efficiency: f64,
    pub rush_def_efficiency: f64,
    pub total_offense: f64,
    pub total_defense: f64,
    pub net_yards: f64,
    pub point_differential: f64,
}

/// `numerator / denominator`, or 0.0 when the quotient would not be finite
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite(numerator / denominator)
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Rank clamped to the league range
fn rank(value: u8) -> i64 {
    (value as i64).clamp(1, MAX_RANK)
}

/// Flip a rank's direction: 1 becomes 32 and 32 becomes 1
fn inverted_rank(value: u8) -> i64 {
    (MAX_RANK + 1 - rank(value)).clamp(1, MAX_RANK)
}

impl DerivedFeatureSet {
    pub const DIM: usize = FEATURE_COUNT;

    /// Column names, parallel to [`DerivedFeatureSet::values`]
    pub const COLUMNS: [&'static str; FEATURE_COUNT] = [
        "TEAM_NAME",
        "GP",
        "W",
        "L",
        "W_PCT",
        "PTS",
        "PTS_RANK",
        "PASS_YDS",
        "PASS_ATT",
        "PASS_PCT",
        "PASS_YDS_RANK",
        "PASS_PCT_RANK",
        "RUSH_YDS",
        "RUSH_ATT",
        "RUSH_AVG",
        "RUSH_YDS_RANK",
        "RUSH_AVG_RANK",
        "RZ_TD_PCT",
        "RZ_ATT",
        "RZ_TD",
        "RZ_TD_PCT_RANK",
        "THIRD_DOWN_PCT",
        "THIRD_DOWN_ATT",
        "THIRD_DOWN_CONV",
        "THIRD_DOWN_PCT_RANK",
        "TURNOVERS",
        "TAKEAWAYS",
        "TURNOVER_DIFF",
        "TURNOVERS_RANK",
        "TAKEAWAYS_RANK",
        "PTS_ALLOWED",
        "PTS_ALLOWED_RANK",
        "PASS_YDS_ALLOWED",
        "RUSH_YDS_ALLOWED",
        "TOTAL_YDS_ALLOWED",
        "PASS_YDS_ALLOWED_RANK",
        "RUSH_YDS_ALLOWED_RANK",
        "SACKS",
        "SACKS_ALLOWED",
        "SACK_DIFF",
        "SACKS_RANK",
        "THIRD_DOWN_DEF_PCT",
        "THIRD_DOWN_DEF_RANK",
        "FG_PCT",
        "FG_MADE",
        "FG_ATT",
        "FG_PCT_RANK",
        "PUNT_RET_AVG",
        "KICK_RET_AVG",
        "PUNT_RET_TD",
        "KICK_RET_TD",
        "ST_PTS",
        "ST_PTS_RANK",
        "TIME_POSS",
        "TIME_POSS_PCT",
        "TIME_POSS_RANK",
        "PENALTIES",
        "PENALTY_YDS",
        "PENALTIES_RANK",
        "HOME_ADVANTAGE",
        "WEATHER_IMPACT",
        "INJURY_IMPACT",
        "OFF_EFFICIENCY",
        "RED_ZONE_EFFICIENCY",
        "THIRD_DOWN_EFFICIENCY",
        "DEF_EFFICIENCY",
        "PASS_DEF_EFFICIENCY",
        "RUSH_DEF_EFFICIENCY",
        "TOTAL_OFFENSE",
        "TOTAL_DEFENSE",
        "NET_YARDS",
        "POINT_DIFFERENTIAL",
    ];

    /// Derive features from cumulative statistics.
    ///
    /// Non-finite counters read as zero, every quotient with a zero
    /// denominator is zero and scaled values that overflow are zeroed, so the
    /// result never contains NaN or infinity.
    pub fn from_stats(stats: &TeamCumulativeStats) -> Self {
        let r = &stats.ranks;

        let pts = finite(stats.pts);
        let plus_minus = finite(stats.plus_minus);
        let fgm = finite(stats.fgm);
        let fga = finite(stats.fga);
        let fg_pct = finite(stats.fg_pct);
        let fg3m = finite(stats.fg3m);
        let fg3a = finite(stats.fg3a);
        let fg3_pct = finite(stats.fg3_pct);
        let ast = finite(stats.ast);
        let stl = finite(stats.stl);
        let blk = finite(stats.blk);
        let pf = finite(stats.pf);

        let pass_yds = finite(fgm * 15.0);
        let pass_att = finite(fga * 2.0);
        let rush_yds = finite(fg3m * 25.0);
        let rush_att = finite(fg3a * 3.0);

        let rz_td_pct = finite(stats.ft_pct);

        let third_down_pct = ast / 30.0;
        let third_down_att = finite(ast * 1.5);
        let third_down_pct_rank = rank(r.ast);

        let turnovers = finite(stats.tov);
        let takeaways = stl;

        let pts_allowed = finite((pts - plus_minus).max(0.0));
        let pass_yds_allowed = finite(finite(stats.dreb) * 12.0);
        let rush_yds_allowed = finite(finite(stats.oreb) * 8.0);
        let total_yds_allowed = finite(pass_yds_allowed + rush_yds_allowed);

        let sacks = blk;
        let sacks_allowed = finite(stats.blka);

        let fg_made = fgm / 10.0;
        let punt_ret_td = (stl - 10.0).max(0.0) / 10.0;
        let kick_ret_td = (blk - 5.0).max(0.0) / 10.0;

        let time_poss = stats
            .min
            .filter(|m| m.is_finite())
            .unwrap_or(DEFAULT_POSSESSION_MINUTES);

        let total_offense = finite(pass_yds + rush_yds);

        DerivedFeatureSet {
            team_name: stats.team_name.clone(),
            gp: stats.gp as i64,
            prior_games: stats.prior_games as i64,
            w: stats.w as i64,
            l: stats.l as i64,
            w_pct: finite(stats.w_pct),
            pts,
            pts_rank: rank(r.pts),

            pass_yds,
            pass_att,
            pass_pct: fg_pct,
            pass_yds_rank: rank(r.fgm),
            pass_pct_rank: rank(r.fg_pct),

            rush_yds,
            rush_att,
            rush_avg: finite(fg3_pct * 10.0),
            rush_yds_rank: rank(r.fg3m),
            rush_avg_rank: rank(r.fg3_pct),

            rz_td_pct,
            rz_att: finite(stats.fta),
            rz_td: finite(stats.ftm),
            rz_td_pct_rank: rank(r.ft_pct),

            third_down_pct,
            third_down_att,
            third_down_conv: finite(third_down_pct * third_down_att),
            third_down_pct_rank,

            turnovers,
            takeaways,
            turnover_diff: finite(takeaways - turnovers),
            turnovers_rank: rank(r.tov),
            takeaways_rank: rank(r.stl),

            pts_allowed,
            pts_allowed_rank: inverted_rank(r.plus_minus),
            pass_yds_allowed,
            rush_yds_allowed,
            total_yds_allowed,
            pass_yds_allowed_rank: rank(r.dreb),
            rush_yds_allowed_rank: rank(r.oreb),
            sacks,
            sacks_allowed,
            sack_diff: finite(sacks - sacks_allowed),
            sacks_rank: rank(r.blk),
            third_down_def_pct: 1.0 - third_down_pct * 0.8,
            third_down_def_rank: (MAX_RANK + 1 - third_down_pct_rank).clamp(1, MAX_RANK),

            fg_pct,
            fg_made,
            fg_att: fga / 10.0,
            fg_pct_rank: rank(r.fg_pct),
            punt_ret_avg: finite(stl * 2.0),
            kick_ret_avg: finite(blk * 3.0),
            punt_ret_td,
            kick_ret_td,
            st_pts: finite(fg_made * 3.0 + punt_ret_td * 6.0 + kick_ret_td * 6.0),
            // Same upstream rank as PASS_PCT_RANK and FG_PCT_RANK
            st_pts_rank: rank(r.fg_pct),

            time_poss,
            time_poss_pct: time_poss / GAME_MINUTES,
            time_poss_rank: rank(r.min),
            penalties: pf,
            penalty_yds: finite(pf * 8.0),
            penalties_rank: rank(r.pf),
            home_advantage: 0.0,
            weather_impact: 0.0,
            injury_impact: 0.0,

            off_efficiency: finite(ratio(pts, pass_att + rush_att) * 100.0),
            red_zone_efficiency: rz_td_pct,
            third_down_efficiency: third_down_pct,
            def_efficiency: finite(ratio(pts_allowed, total_yds_allowed) * 100.0),
            pass_def_efficiency: finite(ratio(pts_allowed, pass_yds_allowed) * 100.0),
            rush_def_efficiency: finite(ratio(pts_allowed, rush_yds_allowed) * 100.0),
            total_offense,
            total_defense: total_yds_allowed,
            net_yards: finite(total_offense - total_yds_allowed),
            point_differential: finite(pts - pts_allowed),
        }
    }

    /// Values in [`DerivedFeatureSet::COLUMNS`] order
    pub fn values(&self) -> Vec<FieldValue> {
        use FieldValue::{Int, Real, Text};

        vec![
            Text(self.team_name.clone()),
            Int(self.gp),
            Int(self.w),
            Int(self.l),
            Real(self.w_pct),
            Real(self.pts),
            Int(self.pts_rank),
            Real(self.pass_yds),
            Real(self.pass_att),
            Real(self.pass_pct),
            Int(self.pass_yds_rank),
            Int(self.pass_pct_rank),
            Real(self.rush_yds),
            Real(self.rush_att),
            Real(self.rush_avg),
            Int(self.rush_yds_rank),
            Int(self.rush_avg_rank),
            Real(self.rz_td_pct),
            Real(self.rz_att),
            Real(self.rz_td),
            Int(self.rz_td_pct_rank),
            Real(self.third_down_pct),
            Real(self.third_down_att),
            Real(self.third_down_conv),
            Int(self.third_down_pct_rank),
            Real(self.turnovers),
            Real(self.takeaways),
            Real(self.turnover_diff),
            Int(self.turnovers_rank),
            Int(self.takeaways_rank),
            Real(self.pts_allowed),
            Int(self.pts_allowed_rank),
            Real(self.pass_yds_allowed),
            Real(self.rush_yds_allowed),
            Real(self.total_yds_allowed),
            Int(self.pass_yds_allowed_rank),
            Int(self.rush_yds_allowed_rank),
            Real(self.sacks),
            Real(self.sacks_allowed),
            Real(self.sack_diff),
            Int(self.sacks_rank),
            Real(self.third_down_def_pct),
            Int(self.third_down_def_rank),
            Real(self.fg_pct),
            Real(self.fg_made),
            Real(self.fg_att),
            Int(self.fg_pct_rank),
            Real(self.punt_ret_avg),
            Real(self.kick_ret_avg),
            Real(self.punt_ret_td),
            Real(self.kick_ret_td),
            Real(self.st_pts),
            Int(self.st_pts_rank),
            Real(self.time_poss),
            Real(self.time_poss_pct),
            Int(self.time_poss_rank),
            Real(self.penalties),
            Real(self.penalty_yds),
            Int(self.penalties_rank),
            Real(self.home_advantage),
            Real(self.weather_impact),
            Real(self.injury_impact),
            Real(self.off_efficiency),
            Real(self.red_zone_efficiency),
            Real(self.third_down_efficiency),
            Real(self.def_efficiency),
            Real(self.pass_def_efficiency),
            Real(self.rush_def_efficiency),
            Real(self.total_offense),
            Real(self.total_defense),
            Real(self.net_yards),
            Real(self.point_differential),
        ]
    }

    /// (column, value) pairs
    pub fn columns(&self) -> Vec<(&'static str, FieldValue)> {
        Self::COLUMNS.iter().copied().zip(self.values()).collect()
    }
}
