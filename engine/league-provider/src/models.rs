use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fantasy team within one league season
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    /// Provider team id, unique within the league
    pub team_id: u32,

    /// Display name (e.g., "Gridiron Gurus")
    pub name: String,

    /// Short abbreviation (e.g., "GG")
    #[serde(default)]
    pub abbreviation: String,

    /// Owner display name, when the provider exposes it
    #[serde(default)]
    pub owner: Option<String>,
}

/// One player's line in a team's weekly lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// Player name (e.g., "Josh Allen")
    pub name: String,

    /// Default position (QB, RB, WR, TE, K, D/ST)
    pub position: String,

    /// Lineup slot the player occupied (QB, RB/WR/TE, BE, ...)
    pub slot: String,

    /// Fantasy points scored
    pub points: f64,

    /// Fantasy points projected before kickoff
    pub projected_points: f64,

    /// NFL opponent abbreviation
    #[serde(default)]
    pub pro_opponent: Option<String>,

    /// Opponent's rank against this position
    #[serde(default)]
    pub opponent_pos_rank: Option<u32>,
}

/// A power-ranking score for one team in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub score: f64,
    pub team: Team,
}

/// The record of one head-to-head matchup in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub home_team: Team,
    pub away_team: Team,
    pub home_score: f64,
    pub away_score: f64,
    #[serde(default)]
    pub home_lineup: Vec<PlayerStat>,
    #[serde(default)]
    pub away_lineup: Vec<PlayerStat>,
}

/// A scheduled matchup from the season schedule, without lineups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMatchup {
    /// Matchup period (week) this game belongs to
    pub matchup_period: u8,

    pub home_team_id: u32,

    /// `None` when the home team has a bye
    pub away_team_id: Option<u32>,

    pub home_score: f64,
    pub away_score: f64,
}

/// Handle to one league season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub league_id: u64,
    pub year: u16,
    pub name: String,

    /// Latest matchup period the provider has results for
    pub current_week: u8,

    pub teams: Vec<Team>,

    #[serde(default)]
    pub schedule: Vec<ScheduledMatchup>,

    /// Scoring weeks of each matchup period; periods missing here span only the week
    /// with the same number
    #[serde(default)]
    pub matchup_periods: BTreeMap<u8, Vec<u8>>,
}

impl League {
    /// All teams in the league, in provider order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Look up a team by its provider id
    pub fn team_by_id(&self, team_id: u32) -> Option<&Team> {
        self.teams.iter().find(|team| team.team_id == team_id)
    }

    /// Look up a team by exact display name
    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.name == name)
    }

    /// Matchup period that scoring week `week` belongs to.
    ///
    /// Playoff rounds may span several scoring weeks, so week 16 of a league with two-week
    /// rounds after a 14-week regular season belongs to period 15.
    pub fn matchup_period_for(&self, week: u8) -> u8 {
        self.matchup_periods
            .iter()
            .find(|(_, weeks)| weeks.contains(&week))
            .map_or(week, |(period, _)| *period)
    }

    /// Team display names, in provider order
    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|team| team.name.clone()).collect()
    }
}
