//! Interactive dashboard session
//!
//! Selector commands (`year`, `week`, `range`, `team`, `matchup-week`) only change what the
//! next `fetch` will request. Display commands (`position`, `min-points`, `lineups`, `show`)
//! re-render cached data and never call the provider.

use colored::*;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use league_analytics::{
    DisplayFilter, MinPoints, PositionFilter, Season, TeamFilter, Week, WeekRange,
};

use crate::cli::parse_week_range;
use crate::error::{DashboardError, Result};
use crate::render::{Renderer, Section};
use crate::service::Dashboard;
use crate::state::{MatchupsParams, PlayersParams, RankingsParams, Selection, ViewKind};
use crate::views;

/// Result of one session command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Output(String),
    Quit,
}

/// Current selector values
#[derive(Debug, Clone, PartialEq)]
pub struct Selectors {
    pub season: Season,
    pub rankings_week: Week,
    pub range: WeekRange,
    pub team: TeamFilter,
    pub matchups_week: Week,
}

impl Selectors {
    pub fn selection(&self, view: ViewKind) -> Selection {
        match view {
            ViewKind::Rankings => {
                Selection::Rankings(RankingsParams { season: self.season, week: self.rankings_week })
            }
            ViewKind::Players => Selection::Players(PlayersParams {
                season: self.season,
                range: self.range,
                team: self.team.clone(),
            }),
            ViewKind::Matchups => {
                Selection::Matchups(MatchupsParams { season: self.season, week: self.matchups_week })
            }
        }
    }
}

pub struct InteractiveSession {
    dashboard: Dashboard,
    renderer: Renderer,
    selectors: Selectors,
}

impl InteractiveSession {
    pub fn new(dashboard: Dashboard) -> Result<Self> {
        let defaults = &dashboard.config().defaults;
        let selectors = Selectors {
            season: defaults.season()?,
            rankings_week: defaults.rankings_week()?,
            range: defaults.week_range()?,
            team: TeamFilter::All,
            matchups_week: defaults.matchups_week()?,
        };
        let display = &dashboard.config().display;
        let renderer = Renderer::new(display.format, display.color, display.chart_width);
        Ok(Self { dashboard, renderer, selectors })
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Read commands from stdin until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.show_welcome();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            self.show_prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match self.handle_line(&line).await {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Output(text)) => {
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
                Err(err) => println!("{} {}", "❌".red(), err.to_string().red()),
            }
        }

        println!("👋 Goodbye!");
        Ok(())
    }

    fn show_welcome(&self) {
        println!();
        println!("{}", "🏈 League Dashboard".cyan().bold());
        println!("{}", "=".repeat(50));
        println!("Type 'help' for available commands.");
        println!();
    }

    fn show_prompt(&self) -> Result<()> {
        print!(
            "{} {}> ",
            self.selectors.season.to_string().cyan().bold(),
            self.selectors.team.to_string().yellow()
        );
        io::stdout().flush()?;
        Ok(())
    }

    /// Handle one command line
    pub async fn handle_line(&mut self, line: &str) -> Result<Outcome> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(Outcome::Output(String::new()));
        }
        let args = &parts[1..];

        let output = match parts[0].to_lowercase().as_str() {
            "quit" | "exit" => return Ok(Outcome::Quit),
            "help" => help_text(),
            "year" => {
                let year = parse_arg::<u16>(args, "year <YYYY>")?;
                self.selectors.season = Season::new(year)?;
                format!("Season set to {}", self.selectors.season)
            }
            "week" => {
                self.selectors.rankings_week = Week::new(parse_arg::<u8>(args, "week <N>")?)?;
                format!("Rankings week set to {}", self.selectors.rankings_week)
            }
            "matchup-week" => {
                self.selectors.matchups_week = Week::new(parse_arg::<u8>(args, "matchup-week <N>")?)?;
                format!("Matchup week set to {}", self.selectors.matchups_week)
            }
            "range" => {
                let value = args.first().ok_or_else(|| usage("range <A-B>"))?;
                self.selectors.range = parse_week_range(value).map_err(DashboardError::Usage)?;
                format!("Week range set to {}", self.selectors.range)
            }
            "team" => {
                self.selectors.team = TeamFilter::from(args.join(" "));
                format!("Team filter set to {}", self.selectors.team)
            }
            "teams" => {
                let league = self.dashboard.league(self.selectors.season).await?;
                self.renderer.render(&views::teams_view(&league)?)?
            }
            "fetch" => self.fetch(args.first().copied().unwrap_or("all")).await?,
            "show" => {
                let view = parse_view(args.first().copied().unwrap_or(""))?;
                self.show(view)?
            }
            "position" | "positions" => {
                let positions = if args.first().map_or(true, |p| p.eq_ignore_ascii_case("all")) {
                    PositionFilter::default()
                } else {
                    PositionFilter::new(args.iter().flat_map(|a| a.split(',')))
                };
                let filter =
                    DisplayFilter { positions, ..self.dashboard.state().display_filter().clone() };
                self.dashboard.state_mut().set_display_filter(filter);
                self.show(ViewKind::Players)?
            }
            "min-points" => {
                let min_points = MinPoints::new(parse_arg::<f64>(args, "min-points <X>")?)?;
                let filter =
                    DisplayFilter { min_points, ..self.dashboard.state().display_filter().clone() };
                self.dashboard.state_mut().set_display_filter(filter);
                self.show(ViewKind::Players)?
            }
            "lineups" => {
                let show = match args.first().copied() {
                    Some("on") => true,
                    Some("off") => false,
                    _ => return Err(usage("lineups on|off")),
                };
                self.dashboard.set_show_lineups(show);
                self.show(ViewKind::Matchups)?
            }
            "status" => self.status(),
            "clear" => {
                self.dashboard.state_mut().clear();
                "Cleared cached views".to_string()
            }
            other => format!("Unknown command '{}'. Type 'help' for available commands.", other),
        };

        Ok(Outcome::Output(output))
    }

    /// Fetch one view, or every view for `all`.
    ///
    /// A single-view fetch returns its error. `fetch all` attempts every view, renders the
    /// ones that loaded and lists the failures after them; each failure is also recorded
    /// in the session state.
    async fn fetch(&mut self, target: &str) -> Result<String> {
        let views = match target.to_lowercase().as_str() {
            "all" => vec![ViewKind::Rankings, ViewKind::Players, ViewKind::Matchups],
            other => {
                let view = parse_view(other)?;
                self.load(view).await?;
                return self.show(view);
            }
        };

        let mut out = Vec::new();
        let mut failures = Vec::new();
        for view in views {
            match self.load(view).await {
                Ok(()) => out.push(self.show(view)?),
                Err(err) => failures.push(format!("  {}: {}", view, err)),
            }
        }

        if !failures.is_empty() {
            warn!("{} of 3 views failed to fetch", failures.len());
            out.push(format!("Fetch failed for {} view(s):", failures.len()));
            out.extend(failures);
        }
        Ok(out.join("\n"))
    }

    async fn load(&mut self, view: ViewKind) -> Result<()> {
        match self.selectors.selection(view) {
            Selection::Rankings(params) => {
                self.dashboard.load_rankings(params).await?;
            }
            Selection::Players(params) => {
                self.dashboard.load_players(params).await?;
            }
            Selection::Matchups(params) => {
                self.dashboard.load_matchups(params).await?;
            }
        }
        Ok(())
    }

    /// Render cached data for a view, flagging it when the selectors have moved on
    fn show(&self, view: ViewKind) -> Result<String> {
        let Some(mut rendered) = self.dashboard.cached_view(view)? else {
            let mut message = format!("No {} data loaded yet. Run 'fetch {}'.", view, view);
            if let Some(failure) = self.dashboard.state().last_failure(view) {
                message.push_str(&format!(" Last fetch failed: {}", failure));
            }
            return Ok(message);
        };

        if self.dashboard.state().is_stale(&self.selectors.selection(view)) {
            rendered.sections.insert(
                0,
                Section::Notice {
                    message: format!(
                        "Selectors changed since the last fetch; run 'fetch {}' to refresh",
                        view
                    ),
                },
            );
        }
        if let Some(failure) = self.dashboard.state().last_failure(view) {
            rendered.sections.insert(
                0,
                Section::Notice { message: format!("Last fetch failed, showing cached data: {}", failure) },
            );
        }
        self.renderer.render(&rendered)
    }

    fn status(&self) -> String {
        let state = self.dashboard.state();
        let mut lines = vec![format!(
            "Selectors: season {}, week {}, weeks {}, team {}, matchup week {}",
            self.selectors.season,
            self.selectors.rankings_week,
            self.selectors.range,
            self.selectors.team,
            self.selectors.matchups_week
        )];

        let fetched_at = |view: ViewKind| match view {
            ViewKind::Rankings => state.rankings().map(|f| f.fetched_at),
            ViewKind::Players => state.players().map(|f| f.fetched_at),
            ViewKind::Matchups => state.matchups().map(|f| f.fetched_at),
        };

        for view in [ViewKind::Rankings, ViewKind::Players, ViewKind::Matchups] {
            let mut line = match fetched_at(view) {
                Some(at) => {
                    let stale = state.is_stale(&self.selectors.selection(view));
                    format!(
                        "{:<9} fetched {}{}",
                        view,
                        at.format("%Y-%m-%d %H:%M:%S"),
                        if stale { " (stale)" } else { "" }
                    )
                }
                None => format!("{:<9} not loaded", view),
            };
            if let Some(failure) = state.last_failure(view) {
                line.push_str(&format!(", last failure: {}", failure));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

fn parse_view(value: &str) -> Result<ViewKind> {
    match value.to_lowercase().as_str() {
        "rankings" => Ok(ViewKind::Rankings),
        "players" => Ok(ViewKind::Players),
        "matchups" => Ok(ViewKind::Matchups),
        _ => Err(usage("fetch|show rankings|players|matchups")),
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[&str], usage_text: &str) -> Result<T> {
    args.first()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| usage(usage_text))
}

fn usage(text: &str) -> DashboardError {
    DashboardError::Usage(format!("Usage: {}", text))
}

fn help_text() -> String {
    [
        "Selectors (take effect on the next fetch):",
        "  year <YYYY>            season 2015-2025",
        "  week <N>               rankings week",
        "  range <A-B>            player week range",
        "  team <name|All Teams>  player team filter",
        "  matchup-week <N>       matchups week",
        "Data:",
        "  fetch [rankings|players|matchups|all]",
        "  teams                  list the season's teams",
        "Display (cached data only):",
        "  show rankings|players|matchups",
        "  position <P...|all>    player detail positions",
        "  min-points <X>         player detail minimum points",
        "  lineups on|off         lineups on matchup cards",
        "  status                 cached views and failures",
        "  clear                  drop cached views",
        "  quit",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DashboardConfig, OutputFormat};
    use league_provider::{
        BoxScore, League, LeagueDataProvider, PlayerStat, SeasonSnapshot, SnapshotProvider, Team,
    };

    fn team(team_id: u32, name: &str) -> Team {
        Team { team_id, name: name.to_string(), abbreviation: String::new(), owner: None }
    }

    fn stat(name: &str, position: &str, points: f64) -> PlayerStat {
        PlayerStat {
            name: name.to_string(),
            position: position.to_string(),
            slot: position.to_string(),
            points,
            projected_points: 12.0,
            pro_opponent: None,
            opponent_pos_rank: None,
        }
    }

    fn league_snapshot() -> SeasonSnapshot {
        let league = League {
            league_id: 1,
            year: 2025,
            name: "Session League".to_string(),
            current_week: 12,
            teams: vec![team(1, "Alpha"), team(2, "Bravo")],
            schedule: Vec::new(),
            matchup_periods: Default::default(),
        };
        let mut snapshot = SeasonSnapshot::new(league);
        snapshot.box_scores.insert(
            12,
            vec![BoxScore {
                home_team: team(1, "Alpha"),
                away_team: team(2, "Bravo"),
                home_score: 110.0,
                away_score: 90.0,
                home_lineup: vec![stat("Quarterback", "QB", 25.0), stat("Kicker", "K", 4.0)],
                away_lineup: vec![stat("Receiver", "WR", 18.0)],
            }],
        );
        snapshot
    }

    fn session() -> InteractiveSession {
        let mut config = DashboardConfig::default();
        config.display.color = false;
        config.display.format = OutputFormat::Table;
        config.defaults.start_week = 12;
        config.defaults.end_week = 12;
        let provider = SnapshotProvider::from_snapshots(vec![league_snapshot()]);
        InteractiveSession::new(Dashboard::with_provider(config, Box::new(provider))).unwrap()
    }

    async fn output(session: &mut InteractiveSession, line: &str) -> String {
        match session.handle_line(line).await.unwrap() {
            Outcome::Output(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_show_before_fetch() {
        let mut session = session();
        let text = output(&mut session, "show players").await;
        assert!(text.contains("No players data loaded yet"));
    }

    #[tokio::test]
    async fn test_display_filters_use_cached_data() {
        let mut session = session();
        output(&mut session, "fetch players").await;

        let text = output(&mut session, "position qb").await;
        let (detail, totals) = text.split_once("Season Totals").unwrap();
        assert!(detail.contains("Player Weeks (positions QB)"));
        assert!(!detail.contains("Kicker"));
        assert!(totals.contains("Kicker"));

        let text = output(&mut session, "min-points 20").await;
        assert!(text.contains("positions QB, min 20.00 pts"));
        assert_eq!(session.dashboard().state().display_filter().min_points.value(), 20.0);
    }

    #[tokio::test]
    async fn test_selector_change_marks_view_stale() {
        let mut session = session();
        output(&mut session, "fetch matchups").await;
        assert!(!output(&mut session, "show matchups").await.contains("Selectors changed"));

        output(&mut session, "matchup-week 3").await;
        let text = output(&mut session, "show matchups").await;
        assert!(text.contains("Selectors changed since the last fetch"));
        // Cached week 12 data is still what gets shown
        assert!(text.contains("Week 12 Matchups"));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_cache() {
        let mut session = session();
        output(&mut session, "fetch matchups").await;
        output(&mut session, "year 2016").await;

        let result = session.handle_line("fetch matchups").await;
        assert!(matches!(result, Err(DashboardError::Upstream(_))));

        let text = output(&mut session, "show matchups").await;
        assert!(text.contains("Last fetch failed"));
        assert!(text.contains("Week 12 Matchups"));
    }

    /// Serves the league and rankings from a snapshot but fails every box score request
    struct NoBoxScores(SnapshotProvider);

    #[async_trait::async_trait]
    impl LeagueDataProvider for NoBoxScores {
        fn name(&self) -> &'static str {
            "no-box-scores"
        }

        async fn get_league(&self, year: u16) -> league_provider::Result<League> {
            self.0.get_league(year).await
        }

        async fn power_rankings(
            &self,
            league: &League,
            week: u8,
        ) -> league_provider::Result<Vec<league_provider::RankingEntry>> {
            self.0.power_rankings(league, week).await
        }

        async fn box_scores(&self, _league: &League, week: u8) -> league_provider::Result<Vec<BoxScore>> {
            Err(league_provider::ProviderError::Status { url: format!("week/{week}"), status: 503 })
        }
    }

    #[tokio::test]
    async fn test_fetch_all_attempts_every_view() {
        let mut session = session();
        let provider = NoBoxScores(SnapshotProvider::from_snapshots(vec![league_snapshot()]));
        session.dashboard = Dashboard::with_provider(session.dashboard.config().clone(), Box::new(provider));

        let text = output(&mut session, "fetch all").await;
        assert!(text.contains("Week 13 Rankings"));
        assert!(text.contains("Fetch failed for 2 view(s):"));
        assert!(text.contains("players:"));
        assert!(text.contains("matchups:"));

        let state = session.dashboard.state();
        assert!(state.has_data(ViewKind::Rankings));
        assert!(state.last_failure(ViewKind::Players).is_some());
        assert!(state.last_failure(ViewKind::Matchups).is_some());
    }

    #[tokio::test]
    async fn test_fetch_all_reports_when_every_view_fails() {
        let mut session = session();
        output(&mut session, "year 2016").await;

        let text = output(&mut session, "fetch all").await;
        assert!(text.contains("Fetch failed for 3 view(s):"));
        for view in [ViewKind::Rankings, ViewKind::Players, ViewKind::Matchups] {
            assert!(session.dashboard.state().last_failure(view).is_some());
        }
    }

    #[tokio::test]
    async fn test_invalid_selectors_rejected() {
        let mut session = session();
        assert!(matches!(
            session.handle_line("week 19").await,
            Err(DashboardError::InvalidParameters(_))
        ));
        assert!(matches!(session.handle_line("year").await, Err(DashboardError::Usage(_))));
        assert!(session.handle_line("range 9-2").await.is_err());
        assert_eq!(session.selectors().rankings_week.number(), 13);
    }

    #[tokio::test]
    async fn test_team_selector_and_quit() {
        let mut session = session();
        output(&mut session, "team Alpha").await;
        assert_eq!(session.selectors().team, TeamFilter::from("Alpha"));
        output(&mut session, "team All Teams").await;
        assert_eq!(session.selectors().team, TeamFilter::All);

        assert_eq!(session.handle_line("quit").await.unwrap(), Outcome::Quit);
    }
}
