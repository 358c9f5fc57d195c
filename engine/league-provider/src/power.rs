//! Two-step dominance power rankings computed from the season schedule

use std::collections::HashMap;

use crate::models::{League, RankingEntry, Team};

const DOMINANCE_WEIGHT: f64 = 0.80;
const SCORE_WEIGHT: f64 = 0.15;
const MARGIN_WEIGHT: f64 = 0.05;

/// Compute power rankings for `week`, highest score first.
///
/// Only matchup periods up to the period containing `week`, capped at
/// `league.current_week`, count. Equal scores keep team-id order.
///
/// Average score and margin are taken over the games a team actually played, not over
/// the number of periods: a bye or an elimination leaves a team's averages unchanged
/// instead of pulling them towards zero.
pub fn compute_power_rankings(league: &League, week: u8) -> Vec<RankingEntry> {
    let period = league.matchup_period_for(week).min(league.current_week);

    let mut teams: Vec<&Team> = league.teams.iter().collect();
    teams.sort_by_key(|team| team.team_id);
    let n = teams.len();
    let index: HashMap<u32, usize> =
        teams.iter().enumerate().map(|(i, team)| (team.team_id, i)).collect();

    let mut wins = vec![vec![0u32; n]; n];
    let mut points = vec![0.0f64; n];
    let mut margins = vec![0.0f64; n];
    let mut games = vec![0u32; n];

    for matchup in league.schedule.iter().filter(|m| m.matchup_period <= period) {
        let Some(away_id) = matchup.away_team_id else {
            continue;
        };
        let (Some(&home), Some(&away)) = (index.get(&matchup.home_team_id), index.get(&away_id))
        else {
            continue;
        };

        points[home] += matchup.home_score;
        points[away] += matchup.away_score;
        margins[home] += matchup.home_score - matchup.away_score;
        margins[away] += matchup.away_score - matchup.home_score;
        games[home] += 1;
        games[away] += 1;

        if matchup.home_score > matchup.away_score {
            wins[home][away] += 1;
        } else if matchup.away_score > matchup.home_score {
            wins[away][home] += 1;
        }
    }

    let dominance = two_step_dominance(&wins);

    let mut entries: Vec<RankingEntry> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let (avg_score, avg_margin) = if games[i] == 0 {
                (0.0, 0.0)
            } else {
                (points[i] / games[i] as f64, margins[i] / games[i] as f64)
            };
            let power = DOMINANCE_WEIGHT * dominance[i] as f64
                + SCORE_WEIGHT * avg_score.trunc()
                + MARGIN_WEIGHT * avg_margin.trunc();
            RankingEntry { score: round2(power), team: (*team).clone() }
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries
}

/// Row sums of `W·W + W`
fn two_step_dominance(wins: &[Vec<u32>]) -> Vec<u64> {
    let n = wins.len();
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let two_step: u64 =
                        (0..n).map(|k| wins[i][k] as u64 * wins[k][j] as u64).sum();
                    two_step + wins[i][j] as u64
                })
                .sum()
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduledMatchup;
    use std::collections::BTreeMap;

    fn team(team_id: u32, name: &str) -> Team {
        Team { team_id, name: name.to_string(), abbreviation: String::new(), owner: None }
    }

    fn game(period: u8, home: u32, away: u32, home_score: f64, away_score: f64) -> ScheduledMatchup {
        ScheduledMatchup {
            matchup_period: period,
            home_team_id: home,
            away_team_id: Some(away),
            home_score,
            away_score,
        }
    }

    fn league(current_week: u8, schedule: Vec<ScheduledMatchup>) -> League {
        League {
            league_id: 1,
            year: 2024,
            name: "Test".to_string(),
            current_week,
            teams: vec![team(3, "Charlie"), team(1, "Alpha"), team(2, "Bravo")],
            schedule,
            matchup_periods: BTreeMap::new(),
        }
    }

    #[test]
    fn test_two_step_dominance() {
        // 0 beat 1, 1 beat 2
        let wins = vec![vec![0, 1, 0], vec![0, 0, 1], vec![0, 0, 0]];
        assert_eq!(two_step_dominance(&wins), vec![2, 1, 0]);
    }

    #[test]
    fn test_power_rankings_order_and_scores() {
        let schedule = vec![
            game(1, 1, 2, 110.4, 90.0),
            game(2, 2, 3, 100.0, 80.0),
        ];
        let rankings = compute_power_rankings(&league(2, schedule), 2);

        assert_eq!(rankings.len(), 3);
        // Alpha: dominance 2 (beat Bravo, Bravo beat Charlie), avg 110, margin 20
        assert_eq!(rankings[0].team.name, "Alpha");
        assert!((rankings[0].score - (0.8 * 2.0 + 0.15 * 110.0 + 0.05 * 20.0)).abs() < 1e-9);
        assert_eq!(rankings[1].team.name, "Bravo");
        assert_eq!(rankings[2].team.name, "Charlie");
    }

    #[test]
    fn test_future_weeks_are_clamped() {
        let schedule = vec![game(1, 1, 2, 100.0, 90.0), game(2, 2, 1, 0.0, 0.0)];
        let at_current = compute_power_rankings(&league(1, schedule.clone()), 1);
        let beyond = compute_power_rankings(&league(1, schedule), 17);
        assert_eq!(at_current, beyond);
    }

    #[test]
    fn test_bye_does_not_lower_averages() {
        // Charlie sits out period 2; its averages stay at its single game
        let schedule = vec![
            game(1, 3, 1, 120.0, 100.0),
            game(2, 1, 2, 90.0, 80.0),
        ];
        let rankings = compute_power_rankings(&league(2, schedule), 2);
        let charlie = rankings.iter().find(|r| r.team.name == "Charlie").unwrap();
        // dominance: beat Alpha (1) + Alpha beat Bravo (1) = 2
        let expected = 0.8 * 2.0 + 0.15 * 120.0 + 0.05 * 20.0;
        assert!((charlie.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_multi_week_round_counts_its_period() {
        let schedule = vec![game(1, 1, 2, 100.0, 90.0), game(2, 2, 1, 130.0, 70.0)];
        let mut league = league(2, schedule);
        league.matchup_periods = BTreeMap::from([(1, vec![1]), (2, vec![2, 3])]);

        // Scoring week 3 belongs to period 2, so both games count
        let week3 = compute_power_rankings(&league, 3);
        let week2 = compute_power_rankings(&league, 2);
        assert_eq!(week3, week2);
        assert_eq!(week3[0].team.name, "Bravo");
    }

    #[test]
    fn test_no_games_yields_zero_scores_in_team_id_order() {
        let rankings = compute_power_rankings(&league(0, Vec::new()), 1);
        let names: Vec<_> = rankings.iter().map(|r| r.team.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
        assert!(rankings.iter().all(|r| r.score == 0.0));
    }
}
