//! Session state for the dashboard
//!
//! Holds the last successful fetch per view together with the parameters it was fetched
//! with, so that display-only changes re-render cached data and selector changes can be
//! detected as stale. A failed fetch is recorded for its view and never clears cached data.

use chrono::{DateTime, Utc};
use league_analytics::{
    DisplayFilter, MatchupReport, PlayerPerformance, RankingTable, Season, TeamFilter, Week,
    WeekRange,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// The three dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewKind {
    Rankings,
    Players,
    Matchups,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewKind::Rankings => "rankings",
            ViewKind::Players => "players",
            ViewKind::Matchups => "matchups",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingsParams {
    pub season: Season,
    pub week: Week,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayersParams {
    pub season: Season,
    pub range: WeekRange,
    pub team: TeamFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchupsParams {
    pub season: Season,
    pub week: Week,
}

/// Current selector values for one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Rankings(RankingsParams),
    Players(PlayersParams),
    Matchups(MatchupsParams),
}

impl Selection {
    pub fn view(&self) -> ViewKind {
        match self {
            Selection::Rankings(_) => ViewKind::Rankings,
            Selection::Players(_) => ViewKind::Players,
            Selection::Matchups(_) => ViewKind::Matchups,
        }
    }
}

/// A fetched result and the parameters that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<P, T> {
    pub params: P,
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

impl<P, T> Fetched<P, T> {
    pub fn new(params: P, data: T) -> Self {
        Self { params, data, fetched_at: Utc::now() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    rankings: Option<Fetched<RankingsParams, RankingTable>>,
    players: Option<Fetched<PlayersParams, PlayerPerformance>>,
    matchups: Option<Fetched<MatchupsParams, MatchupReport>>,
    failures: HashMap<ViewKind, String>,
    display: DisplayFilter,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rankings(&self) -> Option<&Fetched<RankingsParams, RankingTable>> {
        self.rankings.as_ref()
    }

    pub fn players(&self) -> Option<&Fetched<PlayersParams, PlayerPerformance>> {
        self.players.as_ref()
    }

    pub fn matchups(&self) -> Option<&Fetched<MatchupsParams, MatchupReport>> {
        self.matchups.as_ref()
    }

    pub fn store_rankings(&mut self, params: RankingsParams, table: RankingTable) {
        self.failures.remove(&ViewKind::Rankings);
        self.rankings = Some(Fetched::new(params, table));
    }

    pub fn store_players(&mut self, params: PlayersParams, performance: PlayerPerformance) {
        self.failures.remove(&ViewKind::Players);
        self.players = Some(Fetched::new(params, performance));
    }

    pub fn store_matchups(&mut self, params: MatchupsParams, report: MatchupReport) {
        self.failures.remove(&ViewKind::Matchups);
        self.matchups = Some(Fetched::new(params, report));
    }

    /// Record a failed fetch; cached results stay as they were
    pub fn record_failure(&mut self, view: ViewKind, message: impl Into<String>) {
        self.failures.insert(view, message.into());
    }

    pub fn last_failure(&self, view: ViewKind) -> Option<&str> {
        self.failures.get(&view).map(String::as_str)
    }

    pub fn has_data(&self, view: ViewKind) -> bool {
        match view {
            ViewKind::Rankings => self.rankings.is_some(),
            ViewKind::Players => self.players.is_some(),
            ViewKind::Matchups => self.matchups.is_some(),
        }
    }

    /// True when nothing is cached for the view or it was fetched with other parameters
    pub fn is_stale(&self, selection: &Selection) -> bool {
        match selection {
            Selection::Rankings(params) => self.rankings.as_ref().map_or(true, |f| &f.params != params),
            Selection::Players(params) => self.players.as_ref().map_or(true, |f| &f.params != params),
            Selection::Matchups(params) => self.matchups.as_ref().map_or(true, |f| &f.params != params),
        }
    }

    /// Display-only filters for the player detail table
    pub fn display_filter(&self) -> &DisplayFilter {
        &self.display
    }

    pub fn set_display_filter(&mut self, filter: DisplayFilter) {
        self.display = filter;
    }

    /// Drop every cached result, e.g. after switching season
    pub fn clear(&mut self) {
        *self = Self { display: self.display.clone(), ..Self::default() };
    }
}
