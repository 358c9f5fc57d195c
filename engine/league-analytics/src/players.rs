//! Player performance aggregation
//!
//! Box scores for a week range are flattened into one row per player per week per
//! team appearance, filtered by team, then grouped by player name into season totals.
//! Position and minimum-points filters only narrow the detail table; season totals are
//! always computed over the full team-filtered row set.

use league_provider::{BoxScore, PlayerStat, Team};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::params::{MinPoints, PositionFilter, TeamFilter, Week, WeekRange};
use crate::ChartPoint;

/// Box scores fetched for one week
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBoxScores {
    pub week: Week,
    pub box_scores: Vec<BoxScore>,
}

/// One player's line for one week on one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerWeekRow {
    pub week: Week,
    pub team: String,
    pub player: String,
    pub position: String,
    pub slot: String,
    pub points: f64,
    pub projected: f64,
    /// points - projected; negative when the player underperformed
    pub diff: f64,
    pub opponent: Option<String>,
    pub opponent_rank: Option<u32>,
}

impl PlayerWeekRow {
    fn from_stat(week: Week, team: &Team, stat: &PlayerStat) -> Self {
        Self {
            week,
            team: team.name.clone(),
            player: stat.name.clone(),
            position: stat.position.clone(),
            slot: stat.slot.clone(),
            points: stat.points,
            projected: stat.projected_points,
            diff: stat.points - stat.projected_points,
            opponent: stat.pro_opponent.clone(),
            opponent_rank: stat.opponent_pos_rank,
        }
    }
}

/// A player's totals across the selected weeks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSeasonTotal {
    pub player: String,
    pub total_points: f64,
    pub total_projected: f64,
    /// Number of rows (appearances); bye weeks contribute nothing
    pub weeks_played: u32,
}

/// Display-only filters for the detail table
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DisplayFilter {
    pub positions: PositionFilter,
    pub min_points: MinPoints,
}

impl DisplayFilter {
    pub fn admits(&self, row: &PlayerWeekRow) -> bool {
        self.positions.matches(&row.position) && self.min_points.admits(row.points)
    }
}

/// Headline metrics for the player view; `None` means no data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub total_players: usize,
    pub average_points: Option<f64>,
    pub top_scorer: Option<String>,
    pub top_score: Option<f64>,
}

/// Player performance for a week range and team filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPerformance {
    pub range: WeekRange,
    pub team_filter: TeamFilter,
    /// Team-filtered rows in box-score order
    pub rows: Vec<PlayerWeekRow>,
    /// Season totals, highest total points first
    pub totals: Vec<PlayerSeasonTotal>,
}

/// Flatten box scores into player rows, keeping only rows whose team passes `team_filter`.
///
/// Both lineups of every box score are considered and the filter is applied per row, so
/// filtering by one team never pulls in its opponents' players.
pub fn flatten_player_weeks(weeks: &[WeekBoxScores], team_filter: &TeamFilter) -> Vec<PlayerWeekRow> {
    let mut rows = Vec::new();
    for week in weeks {
        for box_score in &week.box_scores {
            let sides = [
                (&box_score.home_team, &box_score.home_lineup),
                (&box_score.away_team, &box_score.away_lineup),
            ];
            for (team, lineup) in sides {
                if !team_filter.matches(&team.name) {
                    continue;
                }
                rows.extend(lineup.iter().map(|stat| PlayerWeekRow::from_stat(week.week, team, stat)));
            }
        }
    }
    rows
}

/// Group rows by player name and total them.
///
/// Groups are taken in name order and then stably sorted by total points, highest first.
pub fn season_totals(rows: &[PlayerWeekRow]) -> Vec<PlayerSeasonTotal> {
    let mut groups: BTreeMap<&str, PlayerSeasonTotal> = BTreeMap::new();
    for row in rows {
        let total = groups.entry(row.player.as_str()).or_insert_with(|| PlayerSeasonTotal {
            player: row.player.clone(),
            total_points: 0.0,
            total_projected: 0.0,
            weeks_played: 0,
        });
        total.total_points += row.points;
        total.total_projected += row.projected;
        total.weeks_played += 1;
    }

    let mut totals: Vec<PlayerSeasonTotal> = groups.into_values().collect();
    totals.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
    totals
}

/// Build the player performance view for `range`.
///
/// Weeks outside `range` are ignored. Missing weeks or a filter that matches nothing
/// produce empty tables.
pub fn aggregate_player_performance(
    range: WeekRange,
    team_filter: &TeamFilter,
    weeks: &[WeekBoxScores],
) -> PlayerPerformance {
    let in_range: Vec<WeekBoxScores> =
        weeks.iter().filter(|w| range.contains(w.week)).cloned().collect();

    let rows = flatten_player_weeks(&in_range, team_filter);
    let totals = season_totals(&rows);
    debug!(
        "Aggregated {} player rows into {} season totals for weeks {} ({})",
        rows.len(),
        totals.len(),
        range,
        team_filter
    );

    PlayerPerformance { range, team_filter: team_filter.clone(), rows, totals }
}

impl PlayerPerformance {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Detail rows passing `filter`, highest points first
    pub fn detail(&self, filter: &DisplayFilter) -> Vec<PlayerWeekRow> {
        let mut rows: Vec<PlayerWeekRow> =
            self.rows.iter().filter(|row| filter.admits(row)).cloned().collect();
        rows.sort_by(|a, b| b.points.total_cmp(&a.points));
        rows
    }

    pub fn summary(&self) -> PlayerSummary {
        let total_players = self.rows.iter().map(|row| row.player.as_str()).collect::<BTreeSet<_>>().len();

        let average_points = if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.iter().map(|row| row.points).sum::<f64>() / self.rows.len() as f64)
        };

        // First row holding the maximum wins
        let mut top: Option<&PlayerWeekRow> = None;
        for row in &self.rows {
            if top.map_or(true, |best| row.points > best.points) {
                top = Some(row);
            }
        }

        PlayerSummary {
            total_players,
            average_points,
            top_scorer: top.map(|row| row.player.clone()),
            top_score: top.map(|row| row.points),
        }
    }

    /// Distinct positions present in the rows, sorted
    pub fn positions(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.position.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Top `n` players by total points
    pub fn top_scorers(&self, n: usize) -> Vec<ChartPoint> {
        self.totals
            .iter()
            .take(n)
            .map(|total| ChartPoint::new(total.player.clone(), total.total_points))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn team(team_id: u32, name: &str) -> Team {
        Team { team_id, name: name.to_string(), abbreviation: String::new(), owner: None }
    }

    fn stat(name: &str, position: &str, points: f64, projected: f64) -> PlayerStat {
        PlayerStat {
            name: name.to_string(),
            position: position.to_string(),
            slot: position.to_string(),
            points,
            projected_points: projected,
            pro_opponent: Some("BUF".to_string()),
            opponent_pos_rank: Some(12),
        }
    }

    fn box_score(home: &str, away: &str, home_lineup: Vec<PlayerStat>, away_lineup: Vec<PlayerStat>) -> BoxScore {
        BoxScore {
            home_team: team(1, home),
            away_team: team(2, away),
            home_score: home_lineup.iter().map(|p| p.points).sum(),
            away_score: away_lineup.iter().map(|p| p.points).sum(),
            home_lineup,
            away_lineup,
        }
    }

    fn week(n: u8, box_scores: Vec<BoxScore>) -> WeekBoxScores {
        WeekBoxScores { week: Week::new(n).unwrap(), box_scores }
    }

    fn sample_weeks() -> Vec<WeekBoxScores> {
        vec![
            week(
                1,
                vec![box_score(
                    "Team A",
                    "Team B",
                    vec![stat("Player P", "QB", 10.0, 12.0), stat("Runner", "RB", 8.0, 9.0)],
                    vec![stat("Opp QB", "QB", 20.0, 18.0), stat("Opp WR", "WR", 5.5, 7.0)],
                )],
            ),
            week(
                2,
                vec![box_score(
                    "Team A",
                    "Team B",
                    vec![stat("Player P", "QB", 15.5, 10.0), stat("Runner", "RB", 3.0, 9.0)],
                    vec![stat("Opp QB", "QB", 11.0, 18.0), stat("Opp WR", "WR", 14.0, 7.0)],
                )],
            ),
            week(
                3,
                vec![box_score(
                    "Team B",
                    "Team A",
                    vec![stat("Opp QB", "QB", 9.0, 18.0), stat("Opp WR", "WR", 1.0, 7.0)],
                    vec![stat("Player P", "QB", 0.0, 5.0), stat("Runner", "RB", 22.0, 9.0)],
                )],
            ),
        ]
    }

    #[test]
    fn test_flatten_row_count() {
        let weeks = sample_weeks();
        let rows = flatten_player_weeks(&weeks, &TeamFilter::All);
        // 3 box scores x 2 sides x 2 players
        assert_eq!(rows.len(), 3 * 2 * 2);
        assert_eq!(rows[0].player, "Player P");
        assert_eq!(rows[0].team, "Team A");
        assert_eq!(rows[2].team, "Team B");
        assert_eq!(rows[0].diff, -2.0);
        assert_eq!(rows[0].opponent.as_deref(), Some("BUF"));
    }

    #[test]
    fn test_team_filter_is_per_row() {
        let weeks = sample_weeks();
        let rows = flatten_player_weeks(&weeks, &TeamFilter::from("Team A"));
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row.team == "Team A"));
        // Team A plays away in week 3 and still contributes
        assert!(rows.iter().any(|row| row.week.number() == 3));
    }

    #[test]
    fn test_season_totals_scenario() {
        let perf = aggregate_player_performance(
            WeekRange::new(1, 3).unwrap(),
            &TeamFilter::from("Team A"),
            &sample_weeks(),
        );
        let p = perf.totals.iter().find(|t| t.player == "Player P").unwrap();
        assert_eq!(p.total_points, 25.5);
        assert_eq!(p.total_projected, 27.0);
        assert_eq!(p.weeks_played, 3);
    }

    #[test]
    fn test_totals_sorted_and_conserve_points() {
        let perf = aggregate_player_performance(
            WeekRange::new(1, 3).unwrap(),
            &TeamFilter::All,
            &sample_weeks(),
        );
        for pair in perf.totals.windows(2) {
            assert!(pair[0].total_points >= pair[1].total_points);
        }
        let from_totals: f64 = perf.totals.iter().map(|t| t.total_points).sum();
        let from_rows: f64 = perf.rows.iter().map(|r| r.points).sum();
        assert!((from_totals - from_rows).abs() < 1e-9);

        let weeks_played: u32 = perf.totals.iter().map(|t| t.weeks_played).sum();
        assert_eq!(weeks_played as usize, perf.rows.len());
    }

    #[test]
    fn test_range_excludes_outside_weeks() {
        let perf = aggregate_player_performance(
            WeekRange::new(2, 2).unwrap(),
            &TeamFilter::All,
            &sample_weeks(),
        );
        assert_eq!(perf.rows.len(), 4);
        assert!(perf.rows.iter().all(|row| row.week.number() == 2));
    }

    #[test]
    fn test_display_filters_do_not_touch_totals() {
        let perf = aggregate_player_performance(
            WeekRange::new(1, 3).unwrap(),
            &TeamFilter::All,
            &sample_weeks(),
        );
        let filter = DisplayFilter {
            positions: PositionFilter::new(["QB"]),
            min_points: MinPoints::new(10.0).unwrap(),
        };
        let detail = perf.detail(&filter);

        assert!(detail.iter().all(|row| row.position == "QB" && row.points >= 10.0));
        assert_eq!(detail.len(), 4);
        // Highest first
        assert_eq!(detail[0].points, 20.0);
        // Totals still include every position and every row
        assert!(perf.totals.iter().any(|t| t.player == "Runner"));
        assert_eq!(perf.totals.iter().find(|t| t.player == "Player P").unwrap().weeks_played, 3);
    }

    #[test]
    fn test_min_points_is_inclusive() {
        let perf = aggregate_player_performance(
            WeekRange::new(1, 1).unwrap(),
            &TeamFilter::All,
            &sample_weeks(),
        );
        let filter = DisplayFilter { min_points: MinPoints::new(8.0).unwrap(), ..Default::default() };
        let players: Vec<_> = perf.detail(&filter).into_iter().map(|r| r.player).collect();
        assert_eq!(players, vec!["Opp QB", "Player P", "Runner"]);
    }

    #[test]
    fn test_empty_inputs_do_not_fail() {
        let range = WeekRange::new(1, 18).unwrap();
        let perf = aggregate_player_performance(range, &TeamFilter::All, &[]);
        assert!(perf.is_empty());
        assert!(perf.totals.is_empty());

        let summary = perf.summary();
        assert_eq!(summary.total_players, 0);
        assert_eq!(summary.average_points, None);
        assert_eq!(summary.top_scorer, None);
        assert_eq!(summary.top_score, None);

        let unmatched =
            aggregate_player_performance(range, &TeamFilter::from("Nobody"), &sample_weeks());
        assert!(unmatched.rows.is_empty());
        assert!(unmatched.totals.is_empty());
    }

    #[test]
    fn test_summary_and_chart() {
        let perf = aggregate_player_performance(
            WeekRange::new(1, 3).unwrap(),
            &TeamFilter::All,
            &sample_weeks(),
        );
        let summary = perf.summary();
        assert_eq!(summary.total_players, 4);
        assert_eq!(summary.top_scorer.as_deref(), Some("Runner"));
        assert_eq!(summary.top_score, Some(22.0));
        let expected_avg = perf.rows.iter().map(|r| r.points).sum::<f64>() / 12.0;
        assert_eq!(summary.average_points, Some(expected_avg));

        assert_eq!(perf.positions(), vec!["QB", "RB", "WR"]);

        let top = perf.top_scorers(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "Opp QB");
        assert_eq!(top[0].value, 40.0);
    }

    const POSITIONS: [&str; 4] = ["QB", "RB", "WR", "TE"];

    /// A lineup drawn from a small player pool so names repeat across weeks and teams
    fn lineup() -> impl Strategy<Value = Vec<PlayerStat>> {
        prop::collection::vec((0usize..6, 0u32..160), 0..5).prop_map(|players| {
            players
                .into_iter()
                .map(|(id, quarter)| {
                    stat(&format!("Player {id}"), POSITIONS[id % POSITIONS.len()], quarter as f64 / 4.0, 10.0)
                })
                .collect()
        })
    }

    fn weeks() -> impl Strategy<Value = Vec<WeekBoxScores>> {
        prop::collection::vec(prop::collection::vec((lineup(), lineup()), 0..3), 1..4).prop_map(|weeks| {
            weeks
                .into_iter()
                .enumerate()
                .map(|(i, games)| {
                    let box_scores =
                        games.into_iter().map(|(home, away)| box_score("Home", "Away", home, away)).collect();
                    week(i as u8 + 1, box_scores)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_flatten_keeps_every_lineup_row(weeks in weeks()) {
            let expected: usize = weeks
                .iter()
                .flat_map(|w| &w.box_scores)
                .map(|b| b.home_lineup.len() + b.away_lineup.len())
                .sum();
            prop_assert_eq!(flatten_player_weeks(&weeks, &TeamFilter::All).len(), expected);

            let home_only: usize =
                weeks.iter().flat_map(|w| &w.box_scores).map(|b| b.home_lineup.len()).sum();
            let rows = flatten_player_weeks(&weeks, &TeamFilter::from("Home"));
            prop_assert_eq!(rows.len(), home_only);
            prop_assert!(rows.iter().all(|row| row.team == "Home"));
        }

        #[test]
        fn prop_season_totals_conserve_points(weeks in weeks()) {
            let range = WeekRange::new(1, 18).unwrap();
            let performance = aggregate_player_performance(range, &TeamFilter::All, &weeks);

            // Quarter points sum exactly in f64
            let row_points: f64 = performance.rows.iter().map(|row| row.points).sum();
            let total_points: f64 = performance.totals.iter().map(|total| total.total_points).sum();
            prop_assert_eq!(row_points, total_points);

            let weeks_played: u32 = performance.totals.iter().map(|total| total.weeks_played).sum();
            prop_assert_eq!(weeks_played as usize, performance.rows.len());
            for pair in performance.totals.windows(2) {
                prop_assert!(pair[0].total_points >= pair[1].total_points);
            }

            // Display filters only narrow the detail table
            let filter = DisplayFilter {
                positions: PositionFilter::new(["QB"]),
                min_points: MinPoints::new(20.0).unwrap(),
            };
            let detail = performance.detail(&filter);
            prop_assert!(detail.iter().all(|row| row.position == "QB" && row.points >= 20.0));
            prop_assert!(detail.windows(2).all(|pair| pair[0].points >= pair[1].points));
        }
    }
}
