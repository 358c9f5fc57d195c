//! Dashboard service: provider access, league cache and session state

use futures::future::try_join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use league_analytics::{
    aggregate_player_performance, build_matchup_report, build_ranking_table, MatchupReport,
    PlayerPerformance, RankingTable, Season, TeamFilter, WeekBoxScores, WeekRange,
};
use league_provider::{connect, League, LeagueDataProvider, SeasonSnapshot, Team};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::render::DashboardView;
use crate::state::{MatchupsParams, PlayersParams, RankingsParams, SessionState, ViewKind};
use crate::views;

/// The dashboard: owns the provider, a per-season league cache and the session state
pub struct Dashboard {
    config: DashboardConfig,
    provider: Box<dyn LeagueDataProvider>,
    leagues: HashMap<Season, Arc<League>>,
    state: SessionState,
}

impl Dashboard {
    /// Create a dashboard with the provider selected by configuration
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let provider = connect(&config.provider)?;
        Ok(Self::with_provider(config, provider))
    }

    pub fn with_provider(config: DashboardConfig, provider: Box<dyn LeagueDataProvider>) -> Self {
        Self { config, provider, leagues: HashMap::new(), state: SessionState::new() }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Toggle lineups on matchup cards for cached and future renders
    pub fn set_show_lineups(&mut self, show: bool) {
        self.config.display.show_lineups = show;
    }

    /// League handle for a season, fetched once and then served from cache
    pub async fn league(&mut self, season: Season) -> Result<Arc<League>> {
        if let Some(league) = self.leagues.get(&season) {
            return Ok(Arc::clone(league));
        }

        info!("Fetching league for season {} from {}", season, self.provider.name());
        let league = Arc::new(self.provider.get_league(season.year()).await?);
        self.leagues.insert(season, Arc::clone(&league));
        Ok(league)
    }

    /// Teams of a season (listTeams)
    pub async fn teams(&mut self, season: Season) -> Result<Vec<Team>> {
        Ok(self.league(season).await?.teams().to_vec())
    }

    /// Fetch power rankings and cache the ranking table
    pub async fn load_rankings(&mut self, params: RankingsParams) -> Result<RankingTable> {
        match self.fetch_rankings(&params).await {
            Ok(table) => {
                self.state.store_rankings(params, table.clone());
                Ok(table)
            }
            Err(err) => {
                warn!("Failed to load rankings for week {}: {}", params.week, err);
                self.state.record_failure(ViewKind::Rankings, err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_rankings(&mut self, params: &RankingsParams) -> Result<RankingTable> {
        let league = self.league(params.season).await?;
        let entries = self.provider.power_rankings(&league, params.week.number()).await?;
        info!("Fetched {} power ranking entries for week {}", entries.len(), params.week);
        if entries.is_empty() {
            warn!("No power rankings for {} week {}", params.season, params.week);
        }
        Ok(build_ranking_table(params.week, &entries))
    }

    /// Fetch box scores for a week range and cache the aggregated player performance.
    ///
    /// Weeks are fetched concurrently; any failed week fails the whole load.
    pub async fn load_players(&mut self, params: PlayersParams) -> Result<PlayerPerformance> {
        match self.fetch_players(&params).await {
            Ok(performance) => {
                self.state.store_players(params, performance.clone());
                Ok(performance)
            }
            Err(err) => {
                warn!("Failed to load player stats for weeks {}: {}", params.range, err);
                self.state.record_failure(ViewKind::Players, err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_players(&mut self, params: &PlayersParams) -> Result<PlayerPerformance> {
        let league = self.league(params.season).await?;
        if let TeamFilter::Team(name) = &params.team {
            if league.team_by_name(name).is_none() {
                warn!("Team filter '{}' matches no team in {}", name, params.season);
            }
        }

        let weeks = self.fetch_week_range(&league, params.range).await?;
        let box_count: usize = weeks.iter().map(|w| w.box_scores.len()).sum();
        info!("Fetched {} box scores for weeks {}", box_count, params.range);

        let performance = aggregate_player_performance(params.range, &params.team, &weeks);
        if performance.is_empty() {
            warn!("No player rows for weeks {} ({})", params.range, params.team);
        }
        Ok(performance)
    }

    async fn fetch_week_range(&self, league: &League, range: WeekRange) -> Result<Vec<WeekBoxScores>> {
        let provider = self.provider.as_ref();
        let fetches = range.weeks().map(|week| async move {
            let box_scores = provider.box_scores(league, week.number()).await?;
            debug!("Week {}: {} box scores", week, box_scores.len());
            Ok::<_, league_provider::ProviderError>(WeekBoxScores { week, box_scores })
        });
        Ok(try_join_all(fetches).await?)
    }

    /// Fetch one week's box scores and cache the matchup report
    pub async fn load_matchups(&mut self, params: MatchupsParams) -> Result<MatchupReport> {
        match self.fetch_matchups(&params).await {
            Ok(report) => {
                self.state.store_matchups(params, report.clone());
                Ok(report)
            }
            Err(err) => {
                warn!("Failed to load matchups for week {}: {}", params.week, err);
                self.state.record_failure(ViewKind::Matchups, err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_matchups(&mut self, params: &MatchupsParams) -> Result<MatchupReport> {
        let league = self.league(params.season).await?;
        let box_scores = self.provider.box_scores(&league, params.week.number()).await?;
        info!("Fetched {} box scores for week {}", box_scores.len(), params.week);
        if box_scores.is_empty() {
            warn!("No matchups for {} week {}", params.season, params.week);
        }
        Ok(build_matchup_report(params.week, &box_scores))
    }

    /// Render the cached result of a view without fetching; `None` when nothing is cached
    pub fn cached_view(&self, view: ViewKind) -> Result<Option<DashboardView>> {
        let rendered = match view {
            ViewKind::Rankings => self
                .state
                .rankings()
                .map(|fetched| views::rankings_view(&fetched.data))
                .transpose()?,
            ViewKind::Players => self
                .state
                .players()
                .map(|fetched| {
                    views::players_view(
                        &fetched.data,
                        self.state.display_filter(),
                        self.config.defaults.top_players,
                    )
                })
                .transpose()?,
            ViewKind::Matchups => self
                .state
                .matchups()
                .map(|fetched| views::matchups_view(&fetched.data, self.config.display.show_lineups))
                .transpose()?,
        };
        Ok(rendered)
    }

    /// Fetch a season's box scores and power rankings for `range` and write them as a
    /// snapshot file under `out_dir`
    pub async fn export_snapshot(
        &mut self,
        season: Season,
        range: WeekRange,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let league = self.league(season).await?;
        let mut snapshot = SeasonSnapshot::new(league.as_ref().clone());

        for week in self.fetch_week_range(&league, range).await? {
            let rankings = self.provider.power_rankings(&league, week.week.number()).await?;
            snapshot.power_rankings.insert(week.week.number(), rankings);
            snapshot.box_scores.insert(week.week.number(), week.box_scores);
        }

        info!(
            "Exporting {} weeks of season {} from {}",
            snapshot.box_scores.len(),
            season,
            self.provider.name()
        );
        Ok(snapshot.save(out_dir).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_analytics::Week;
    use league_provider::{BoxScore, PlayerStat, SnapshotProvider};

    fn team(team_id: u32, name: &str) -> Team {
        Team { team_id, name: name.to_string(), abbreviation: String::new(), owner: None }
    }

    fn dashboard() -> Dashboard {
        let league = League {
            league_id: 7,
            year: 2024,
            name: "Test League".to_string(),
            current_week: 3,
            teams: vec![team(1, "Alpha"), team(2, "Bravo")],
            schedule: Vec::new(),
            matchup_periods: Default::default(),
        };
        let mut snapshot = SeasonSnapshot::new(league);
        snapshot.box_scores.insert(
            2,
            vec![BoxScore {
                home_team: team(1, "Alpha"),
                away_team: team(2, "Bravo"),
                home_score: 90.0,
                away_score: 95.5,
                home_lineup: vec![PlayerStat {
                    name: "Starter".to_string(),
                    position: "RB".to_string(),
                    slot: "RB".to_string(),
                    points: 90.0,
                    projected_points: 80.0,
                    pro_opponent: None,
                    opponent_pos_rank: None,
                }],
                away_lineup: Vec::new(),
            }],
        );
        let provider = SnapshotProvider::from_snapshots(vec![snapshot]);
        Dashboard::with_provider(DashboardConfig::default(), Box::new(provider))
    }

    fn season() -> Season {
        Season::new(2024).unwrap()
    }

    #[tokio::test]
    async fn test_league_cached_per_season() {
        let mut dashboard = dashboard();
        let first = dashboard.league(season()).await.unwrap();
        let second = dashboard.league(season()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(dashboard.teams(season()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_load_matchups_stores_state() {
        let mut dashboard = dashboard();
        let params = MatchupsParams { season: season(), week: Week::new(2).unwrap() };
        let report = dashboard.load_matchups(params.clone()).await.unwrap();

        assert_eq!(report.summary[0].winner, "Bravo");
        assert_eq!(dashboard.state().matchups().unwrap().params, params);
        assert!(dashboard.cached_view(ViewKind::Matchups).unwrap().is_some());
        assert!(dashboard.cached_view(ViewKind::Rankings).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_season_records_failure() {
        let mut dashboard = dashboard();
        let params = RankingsParams { season: Season::new(2019).unwrap(), week: Week::new(1).unwrap() };
        let result = dashboard.load_rankings(params).await;

        assert!(matches!(result, Err(crate::error::DashboardError::Upstream(_))));
        assert!(dashboard.state().last_failure(ViewKind::Rankings).is_some());
        assert!(!dashboard.state().has_data(ViewKind::Rankings));
    }

    #[tokio::test]
    async fn test_load_players_over_range() {
        let mut dashboard = dashboard();
        let params = PlayersParams {
            season: season(),
            range: WeekRange::new(1, 3).unwrap(),
            team: TeamFilter::All,
        };
        let performance = dashboard.load_players(params).await.unwrap();
        assert_eq!(performance.rows.len(), 1);
        assert_eq!(performance.rows[0].week.number(), 2);
    }
}
