//! # Command Line Interface
//!
//! One-shot commands for each dashboard view plus snapshot export and config init.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use league_analytics::{
    DisplayFilter, MinPoints, PositionFilter, Season, TeamFilter, Week, WeekRange,
};

use crate::config::{DashboardConfig, OutputFormat};
use crate::error::Result;
use crate::render::Renderer;
use crate::service::Dashboard;
use crate::state::{MatchupsParams, PlayersParams, RankingsParams};
use crate::views;

/// Fantasy football league dashboard
#[derive(Parser, Debug)]
#[command(name = "league-dashboard")]
#[command(about = "Power rankings, player performance and matchups for a fantasy football league")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./league-dashboard.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Season year (2015-2025)
    #[arg(short, long, global = true)]
    pub year: Option<u16>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Show power rankings for a week
    Rankings {
        /// Week (1-18)
        #[arg(short, long)]
        week: Option<u8>,
    },
    /// Show player performance over a week range
    Players {
        /// First week of the range
        #[arg(long)]
        start_week: Option<u8>,

        /// Last week of the range
        #[arg(long)]
        end_week: Option<u8>,

        /// Team display name, or "All Teams"
        #[arg(short, long)]
        team: Option<String>,

        /// Only show these positions in the detail table (repeatable)
        #[arg(short, long = "position")]
        positions: Vec<String>,

        /// Only show rows with at least this many points
        #[arg(short, long)]
        min_points: Option<f64>,
    },
    /// Show head-to-head matchups for a week
    Matchups {
        /// Week (1-18)
        #[arg(short, long)]
        week: Option<u8>,

        /// Include both lineups on every matchup card
        #[arg(long)]
        lineups: bool,
    },
    /// List the teams of the season
    Teams,
    /// Interactive session with explicit fetches and local filters
    Session,
    /// Fetch a season and write it as a JSON snapshot
    ExportSnapshot {
        /// Week range, e.g. 1-14 (defaults to the configured range)
        #[arg(long, value_parser = parse_week_range)]
        weeks: Option<WeekRange>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Write the default configuration to a TOML file
    InitConfig {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse `A-B` or a single week `A`
pub fn parse_week_range(value: &str) -> std::result::Result<WeekRange, String> {
    let value = value.trim();
    let (start, end) = match value.split_once('-') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (value, value),
    };
    let start: u8 = start.parse().map_err(|_| format!("Invalid start week: '{}'", start))?;
    let end: u8 = end.parse().map_err(|_| format!("Invalid end week: '{}'", end))?;
    WeekRange::new(start, end).map_err(|e| e.to_string())
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(year) = self.year {
            config.defaults.year = year;
        }
        if let Some(format) = self.format {
            config.display.format = format;
        }
        if self.no_color {
            config.display.color = false;
        }
        if let Commands::Matchups { lineups: true, .. } = self.command {
            config.display.show_lineups = true;
        }
    }
}

/// CLI handler
pub struct CliHandler {
    dashboard: Dashboard,
    renderer: Renderer,
}

impl CliHandler {
    pub fn new(dashboard: Dashboard) -> Self {
        let display = &dashboard.config().display;
        let renderer = Renderer::new(display.format, display.color, display.chart_width);
        Self { dashboard, renderer }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    fn season(&self) -> Result<Season> {
        self.dashboard.config().defaults.season()
    }

    /// Handle a one-shot command and return the rendered output
    pub async fn handle_command(&mut self, command: Commands) -> Result<String> {
        match command {
            Commands::Rankings { week } => self.show_rankings(week).await,
            Commands::Players { start_week, end_week, team, positions, min_points } => {
                self.show_players(start_week, end_week, team, positions, min_points).await
            }
            Commands::Matchups { week, .. } => self.show_matchups(week).await,
            Commands::Teams => self.show_teams().await,
            Commands::ExportSnapshot { weeks, out } => self.export_snapshot(weeks, out).await,
            Commands::Session | Commands::InitConfig { .. } => Ok(String::new()),
        }
    }

    async fn show_rankings(&mut self, week: Option<u8>) -> Result<String> {
        // Validate before touching the provider
        let season = self.season()?;
        let week = match week {
            Some(week) => Week::new(week)?,
            None => self.dashboard.config().defaults.rankings_week()?,
        };

        let table = self.dashboard.load_rankings(RankingsParams { season, week }).await?;
        self.renderer.render(&views::rankings_view(&table)?)
    }

    async fn show_players(
        &mut self,
        start_week: Option<u8>,
        end_week: Option<u8>,
        team: Option<String>,
        positions: Vec<String>,
        min_points: Option<f64>,
    ) -> Result<String> {
        let season = self.season()?;
        let defaults = &self.dashboard.config().defaults;
        let range = WeekRange::new(
            start_week.unwrap_or(defaults.start_week),
            end_week.unwrap_or(defaults.end_week),
        )?;
        let filter = DisplayFilter {
            positions: PositionFilter::new(positions),
            min_points: MinPoints::new(min_points.unwrap_or(0.0))?,
        };
        let team = team.map(TeamFilter::from).unwrap_or_default();
        let top_n = defaults.top_players;

        let performance = self.dashboard.load_players(PlayersParams { season, range, team }).await?;
        self.dashboard.state_mut().set_display_filter(filter.clone());
        self.renderer.render(&views::players_view(&performance, &filter, top_n)?)
    }

    async fn show_matchups(&mut self, week: Option<u8>) -> Result<String> {
        let season = self.season()?;
        let week = match week {
            Some(week) => Week::new(week)?,
            None => self.dashboard.config().defaults.matchups_week()?,
        };
        let show_lineups = self.dashboard.config().display.show_lineups;

        let report = self.dashboard.load_matchups(MatchupsParams { season, week }).await?;
        self.renderer.render(&views::matchups_view(&report, show_lineups)?)
    }

    async fn show_teams(&mut self) -> Result<String> {
        let season = self.season()?;
        let league = self.dashboard.league(season).await?;
        self.renderer.render(&views::teams_view(&league)?)
    }

    async fn export_snapshot(&mut self, weeks: Option<WeekRange>, out: PathBuf) -> Result<String> {
        let season = self.season()?;
        let range = match weeks {
            Some(range) => range,
            None => self.dashboard.config().defaults.week_range()?,
        };
        let path = self.dashboard.export_snapshot(season, range, &out).await?;
        Ok(format!("Wrote {} snapshot for weeks {} to {}", season, range, path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_week_range() {
        let range = parse_week_range("3-7").unwrap();
        assert_eq!((range.start().number(), range.end().number()), (3, 7));

        let single = parse_week_range("5").unwrap();
        assert_eq!(single.len(), 1);

        assert!(parse_week_range("7-3").is_err());
        assert!(parse_week_range("0-3").is_err());
        assert!(parse_week_range("a-b").is_err());
    }

    #[test]
    fn test_cli_parses_players_command() {
        let cli = Cli::try_parse_from([
            "league-dashboard",
            "--year",
            "2023",
            "players",
            "--start-week",
            "2",
            "--end-week",
            "4",
            "--team",
            "All Teams",
            "-p",
            "QB",
            "-p",
            "WR",
            "--min-points",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.year, Some(2023));
        assert_eq!(
            cli.command,
            Commands::Players {
                start_week: Some(2),
                end_week: Some(4),
                team: Some("All Teams".to_string()),
                positions: vec!["QB".to_string(), "WR".to_string()],
                min_points: Some(10.0),
            }
        );
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "league-dashboard",
            "matchups",
            "--lineups",
            "--format",
            "json",
            "--no-color",
            "-y",
            "2021",
        ])
        .unwrap();
        let mut config = DashboardConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.defaults.year, 2021);
        assert_eq!(config.display.format, OutputFormat::Json);
        assert!(!config.display.color);
        assert!(config.display.show_lineups);
    }

    #[test]
    fn test_export_snapshot_week_range_parsed() {
        let cli = Cli::try_parse_from([
            "league-dashboard",
            "export-snapshot",
            "--weeks",
            "1-14",
            "--out",
            "snapshots",
        ])
        .unwrap();
        match cli.command {
            Commands::ExportSnapshot { weeks: Some(range), out } => {
                assert_eq!(range.to_string(), "1-14");
                assert_eq!(out, PathBuf::from("snapshots"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
