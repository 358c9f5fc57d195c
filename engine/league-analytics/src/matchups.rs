//! Head-to-head matchup view

use league_provider::{BoxScore, PlayerStat};
use serde::Serialize;
use tracing::debug;

use crate::params::Week;

/// Side of a matchup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchupSide {
    Home,
    Away,
}

/// Winner policy for a single matchup.
///
/// Home wins only with a strictly greater score, so equal scores go to the away team.
pub fn decide_winner(home_score: f64, away_score: f64) -> MatchupSide {
    if home_score > away_score {
        MatchupSide::Home
    } else {
        MatchupSide::Away
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScore {
    pub name: String,
    pub score: f64,
}

/// A starter or bench line on a matchup card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupRow {
    pub player: String,
    pub slot: String,
    pub points: f64,
    pub projected: f64,
}

impl From<&PlayerStat> for LineupRow {
    fn from(stat: &PlayerStat) -> Self {
        Self {
            player: stat.name.clone(),
            slot: stat.slot.clone(),
            points: stat.points,
            projected: stat.projected_points,
        }
    }
}

/// Per-matchup card with both sides and lineups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupCard {
    /// 1-based position in the week's box score list
    pub index: usize,
    pub home: TeamScore,
    pub away: TeamScore,
    pub winner: MatchupSide,
    pub margin: f64,
    pub home_lineup: Vec<LineupRow>,
    pub away_lineup: Vec<LineupRow>,
}

impl MatchupCard {
    pub fn winning_team(&self) -> &TeamScore {
        match self.winner {
            MatchupSide::Home => &self.home,
            MatchupSide::Away => &self.away,
        }
    }

    pub fn losing_team(&self) -> &TeamScore {
        match self.winner {
            MatchupSide::Home => &self.away,
            MatchupSide::Away => &self.home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupSummaryRow {
    pub winner: String,
    pub winner_score: f64,
    pub loser: String,
    pub loser_score: f64,
    /// winner_score - loser_score, never negative
    pub margin: f64,
}

/// Week-level totals; averages are `None` when the week has no matchups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupWeekStats {
    pub matchup_count: usize,
    pub total_home: f64,
    pub total_away: f64,
    pub average_home: Option<f64>,
    pub average_away: Option<f64>,
}

impl MatchupWeekStats {
    fn from_cards(cards: &[MatchupCard]) -> Self {
        let matchup_count = cards.len();
        let total_home: f64 = cards.iter().map(|card| card.home.score).sum();
        let total_away: f64 = cards.iter().map(|card| card.away.score).sum();
        let average = |total: f64| (matchup_count > 0).then(|| total / matchup_count as f64);

        Self {
            matchup_count,
            total_home,
            total_away,
            average_home: average(total_home),
            average_away: average(total_away),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupReport {
    pub week: Week,
    pub cards: Vec<MatchupCard>,
    /// One row per box score, input order
    pub summary: Vec<MatchupSummaryRow>,
    pub stats: MatchupWeekStats,
}

impl MatchupReport {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Build the matchup view for one week. Output order follows `box_scores`.
pub fn build_matchup_report(week: Week, box_scores: &[BoxScore]) -> MatchupReport {
    let cards: Vec<MatchupCard> = box_scores
        .iter()
        .enumerate()
        .map(|(index, box_score)| {
            let winner = decide_winner(box_score.home_score, box_score.away_score);
            let margin = (box_score.home_score - box_score.away_score).abs();
            MatchupCard {
                index: index + 1,
                home: TeamScore { name: box_score.home_team.name.clone(), score: box_score.home_score },
                away: TeamScore { name: box_score.away_team.name.clone(), score: box_score.away_score },
                winner,
                margin,
                home_lineup: box_score.home_lineup.iter().map(LineupRow::from).collect(),
                away_lineup: box_score.away_lineup.iter().map(LineupRow::from).collect(),
            }
        })
        .collect();

    let summary = cards
        .iter()
        .map(|card| {
            let winner = card.winning_team();
            let loser = card.losing_team();
            MatchupSummaryRow {
                winner: winner.name.clone(),
                winner_score: winner.score,
                loser: loser.name.clone(),
                loser_score: loser.score,
                margin: card.margin,
            }
        })
        .collect();

    let stats = MatchupWeekStats::from_cards(&cards);
    debug!("Built matchup report for week {} with {} matchups", week, stats.matchup_count);

    MatchupReport { week, cards, summary, stats }
}
