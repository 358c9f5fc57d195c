//! Power-ranking view

use league_provider::RankingEntry;
use serde::Serialize;
use tracing::debug;

use crate::params::Week;
use crate::ChartPoint;

/// One row of the ranking table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    /// 1-based rank, 1 = highest score
    pub rank: u32,
    pub team_name: String,
    pub score: f64,
}

/// Ranking table for one week, ordered by ascending rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTable {
    pub week: Week,
    pub rows: Vec<RankingRow>,
}

/// Rank entries by descending score.
///
/// The input order is not trusted; entries with equal scores keep their input order.
pub fn build_ranking_table(week: Week, entries: &[RankingEntry]) -> RankingTable {
    let mut ordered: Vec<&RankingEntry> = entries.iter().collect();
    // `sort_by` is stable, which is the tie-break
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    let rows: Vec<RankingRow> = ordered
        .into_iter()
        .enumerate()
        .map(|(index, entry)| RankingRow {
            rank: (index + 1) as u32,
            team_name: entry.team.name.clone(),
            score: entry.score,
        })
        .collect();

    debug!("Built ranking table for week {} with {} teams", week, rows.len());
    RankingTable { week, rows }
}

impl RankingTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rank-1 row
    pub fn top_team(&self) -> Option<&RankingRow> {
        self.rows.first()
    }

    pub fn high_score(&self) -> Option<f64> {
        self.top_team().map(|row| row.score)
    }

    pub fn team_count(&self) -> usize {
        self.rows.len()
    }

    /// (team, score) series in rank order
    pub fn chart(&self) -> Vec<ChartPoint> {
        self.rows.iter().map(|row| ChartPoint::new(row.team_name.clone(), row.score)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use league_provider::Team;

    fn entry(score: f64, team_id: u32, name: &str) -> RankingEntry {
        RankingEntry {
            score,
            team: Team {
                team_id,
                name: name.to_string(),
                abbreviation: String::new(),
                owner: None,
            },
        }
    }

    fn week(n: u8) -> Week {
        Week::new(n).unwrap()
    }

    #[test]
    fn test_stable_tie_break() {
        let entries = vec![
            entry(88.5, 1, "TeamA"),
            entry(102.3, 2, "TeamB"),
            entry(102.3, 3, "TeamC"),
        ];
        let table = build_ranking_table(week(5), &entries);

        let ranked: Vec<(u32, &str, f64)> =
            table.rows.iter().map(|r| (r.rank, r.team_name.as_str(), r.score)).collect();
        assert_eq!(
            ranked,
            vec![(1, "TeamB", 102.3), (2, "TeamC", 102.3), (3, "TeamA", 88.5)]
        );
    }

    #[test]
    fn test_ranks_are_contiguous_and_sorted() {
        let entries = vec![
            entry(10.0, 1, "A"),
            entry(30.0, 2, "B"),
            entry(20.0, 3, "C"),
            entry(-5.0, 4, "D"),
            entry(30.0, 5, "E"),
        ];
        let table = build_ranking_table(week(1), &entries);

        assert_eq!(table.team_count(), entries.len());
        for (index, row) in table.rows.iter().enumerate() {
            assert_eq!(row.rank, index as u32 + 1);
        }
        for pair in table.rows.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(table.rows[0].team_name, "B");
        assert_eq!(table.rows[1].team_name, "E");
    }

    #[test]
    fn test_derived_metrics() {
        let table = build_ranking_table(week(13), &[entry(71.2, 1, "A"), entry(95.0, 2, "B")]);
        assert_eq!(table.top_team().map(|r| r.team_name.as_str()), Some("B"));
        assert_eq!(table.high_score(), Some(95.0));
        assert_eq!(table.team_count(), 2);
        assert_eq!(table.chart(), vec![ChartPoint::new("B", 95.0), ChartPoint::new("A", 71.2)]);
    }

    #[test]
    fn test_empty_rankings() {
        let table = build_ranking_table(week(18), &[]);
        assert!(table.is_empty());
        assert_eq!(table.top_team(), None);
        assert_eq!(table.high_score(), None);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let entries = vec![entry(1.0, 1, "Low"), entry(2.0, 2, "High")];
        let before = entries.clone();
        let _ = build_ranking_table(week(2), &entries);
        assert_eq!(entries, before);
    }

    /// Scores drawn from a small grid so equal scores are common
    fn scores() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec((0u32..8).prop_map(|step| step as f64 * 12.5), 0..12)
    }

    proptest! {
        #[test]
        fn prop_ranks_contiguous_and_scores_descending(scores in scores()) {
            let entries: Vec<RankingEntry> = scores
                .iter()
                .enumerate()
                .map(|(i, score)| entry(*score, i as u32, &format!("Team {i}")))
                .collect();
            let table = build_ranking_table(week(5), &entries);

            prop_assert_eq!(table.rows.len(), entries.len());
            for (i, row) in table.rows.iter().enumerate() {
                prop_assert_eq!(row.rank, i as u32 + 1);
            }
            for pair in table.rows.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                // Equal scores keep input order
                if pair[0].score == pair[1].score {
                    let first: usize = pair[0].team_name[5..].parse().unwrap();
                    let second: usize = pair[1].team_name[5..].parse().unwrap();
                    prop_assert!(first < second);
                }
            }
            prop_assert_eq!(table.high_score(), scores.iter().copied().reduce(f64::max));
        }
    }
}
