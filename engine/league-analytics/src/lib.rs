//! League Analytics
//!
//! Pure transformations from raw league entities into the three dashboard views:
//! power rankings, player performance and head-to-head matchups. Nothing here performs
//! I/O; inputs are borrowed and never mutated.

pub mod error;
pub mod matchups;
pub mod params;
pub mod players;
pub mod rankings;

pub use error::{ParamError, Result};
pub use matchups::{
    build_matchup_report, decide_winner, LineupRow, MatchupCard, MatchupReport, MatchupSide,
    MatchupSummaryRow, MatchupWeekStats, TeamScore,
};
pub use params::{MinPoints, PositionFilter, Season, TeamFilter, Week, WeekRange, ALL_TEAMS};
pub use players::{
    aggregate_player_performance, flatten_player_weeks, season_totals, DisplayFilter,
    PlayerPerformance, PlayerSeasonTotal, PlayerSummary, PlayerWeekRow, WeekBoxScores,
};
pub use rankings::{build_ranking_table, RankingRow, RankingTable};

use serde::Serialize;

/// One bar of a single-series bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self { label: label.into(), value }
    }
}
