//! ESPN fantasy football read API
//!
//! Wire structs mirror the subset of the `mTeam`, `mMatchup`, `mSettings`,
//! `mBoxscore` and `mPositionalRatings` views plus the NFL schedule the dashboard needs,
//! and are converted into the provider models.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::models::{BoxScore, League, PlayerStat, RankingEntry, ScheduledMatchup, Team};
use crate::power::compute_power_rankings;
use crate::provider::LeagueDataProvider;

/// Seasons before this one are only served from the league history endpoint
const FIRST_CURRENT_API_SEASON: u16 = 2018;

const STAT_SOURCE_ACTUAL: u8 = 0;
const STAT_SOURCE_PROJECTED: u8 = 1;

/// ESPN-backed league data provider
pub struct EspnProvider {
    config: ProviderConfig,
    client: Client,
    /// NFL schedules per season, fetched once
    pro_schedules: Mutex<HashMap<u16, Arc<ProSchedule>>>,
}

impl EspnProvider {
    /// Create a new ESPN provider, reading private-league cookies from the environment
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(credentials) = config.credentials()? {
            let cookie = HeaderValue::from_str(&credentials.cookie_header()).map_err(|e| {
                ProviderError::Configuration(format!("invalid ESPN cookie value: {e}"))
            })?;
            headers.insert(COOKIE, cookie);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { config, client, pro_schedules: Mutex::new(HashMap::new()) })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn league_url(&self, year: u16) -> String {
        let base = self.base_url();
        if year < FIRST_CURRENT_API_SEASON {
            format!("{}/leagueHistory/{}?seasonId={}", base, self.config.league_id, year)
        } else {
            format!("{}/seasons/{}/segments/0/leagues/{}", base, year, self.config.league_id)
        }
    }

    async fn fetch_text(
        &self,
        url: &str,
        year: u16,
        query: &[(&str, String)],
        filter: Option<String>,
    ) -> Result<String> {
        debug!("Fetching ESPN data from: {}", url);

        let mut request = self.client.get(url).query(query);
        if let Some(filter) = filter {
            request = request.header("x-fantasy-filter", filter);
        }
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::SeasonNotFound {
                    league_id: self.config.league_id,
                    year,
                });
            }
            status => {
                return Err(ProviderError::Status { url: url.to_string(), status: status.as_u16() })
            }
        }

        Ok(response.text().await?)
    }

    async fn fetch_league_json<T: DeserializeOwned>(
        &self,
        year: u16,
        query: &[(&str, String)],
        filter: Option<String>,
    ) -> Result<T> {
        let body = self.fetch_text(&self.league_url(year), year, query, filter).await?;
        if year < FIRST_CURRENT_API_SEASON {
            // League history wraps the season in a single-element array
            let mut seasons: Vec<T> = decode(&body, "league history")?;
            if seasons.is_empty() {
                return Err(ProviderError::SeasonNotFound {
                    league_id: self.config.league_id,
                    year,
                });
            }
            Ok(seasons.swap_remove(0))
        } else {
            decode(&body, "league")
        }
    }

    /// NFL schedule for a season, served from cache after the first fetch
    async fn pro_schedule(&self, year: u16) -> Result<Arc<ProSchedule>> {
        let mut cache = self.pro_schedules.lock().await;
        if let Some(schedule) = cache.get(&year) {
            return Ok(Arc::clone(schedule));
        }

        let url = format!("{}/seasons/{}", self.base_url(), year);
        let query = [("view", "proTeamSchedules_wl".to_string())];
        let body = self.fetch_text(&url, year, &query, None).await?;
        let wire: WireProSeason = decode(&body, "pro team schedules")?;
        let schedule = Arc::new(ProSchedule::from(wire));

        debug!("Cached NFL schedule for {} ({} teams)", year, schedule.abbreviations.len());
        cache.insert(year, Arc::clone(&schedule));
        Ok(schedule)
    }

    /// Rank of every NFL defense against every position, keyed by (position id, team id)
    async fn positional_ratings(&self, year: u16) -> Result<HashMap<(u16, u32), u32>> {
        let query = [("view", "mPositionalRatings".to_string())];
        let wire: WirePositionalRatingsResponse = self.fetch_league_json(year, &query, None).await?;
        Ok(wire.ranks())
    }

    /// Opponent context for the lineups of one scoring week.
    ///
    /// League history seasons have neither view, so their rows carry no opponent data.
    async fn pro_context(&self, year: u16, week: u8) -> Result<ProContext> {
        if year < FIRST_CURRENT_API_SEASON {
            return Ok(ProContext::default());
        }
        let (schedule, ratings) =
            tokio::try_join!(self.pro_schedule(year), self.positional_ratings(year))?;
        Ok(ProContext { week, schedule, ratings })
    }
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| ProviderError::Decode { what: what.to_string(), reason: e.to_string() })
}

#[async_trait]
impl LeagueDataProvider for EspnProvider {
    fn name(&self) -> &'static str {
        "espn"
    }

    async fn get_league(&self, year: u16) -> Result<League> {
        let query = [
            ("view", "mTeam".to_string()),
            ("view", "mMatchup".to_string()),
            ("view", "mSettings".to_string()),
        ];
        let wire: WireLeague = self.fetch_league_json(year, &query, None).await?;
        let league = wire.into_league(self.config.league_id, year);

        info!(
            "Fetched league {} ({}) with {} teams, current week {}",
            league.name,
            year,
            league.teams.len(),
            league.current_week
        );
        Ok(league)
    }

    async fn power_rankings(&self, league: &League, week: u8) -> Result<Vec<RankingEntry>> {
        let rankings = compute_power_rankings(league, week);
        info!("Computed {} power rankings for week {}", rankings.len(), week);
        Ok(rankings)
    }

    async fn box_scores(&self, league: &League, week: u8) -> Result<Vec<BoxScore>> {
        let period = league.matchup_period_for(week);
        let query = [
            ("view", "mMatchupScore".to_string()),
            ("view", "mScoreboard".to_string()),
            ("view", "mBoxscore".to_string()),
            ("scoringPeriodId", week.to_string()),
        ];
        let filter =
            format!(r#"{{"schedule":{{"filterMatchupPeriodIds":{{"value":[{period}]}}}}}}"#);

        let (wire, context) = tokio::try_join!(
            self.fetch_league_json::<WireBoxScoreResponse>(league.year, &query, Some(filter)),
            self.pro_context(league.year, week),
        )?;

        let box_scores = convert_box_scores(league, week, &wire, &context)?;
        info!(
            "Fetched {} box scores for {} week {} (matchup period {})",
            box_scores.len(),
            league.year,
            week,
            period
        );
        Ok(box_scores)
    }
}

/// Box scores of scoring week `week`, taken from the matchups of the period containing it
fn convert_box_scores(
    league: &League,
    week: u8,
    wire: &WireBoxScoreResponse,
    context: &ProContext,
) -> Result<Vec<BoxScore>> {
    let period = league.matchup_period_for(week);
    let multi_week = league.matchup_periods.get(&period).is_some_and(|weeks| weeks.len() > 1);
    let teams: HashMap<u32, &Team> =
        league.teams.iter().map(|team| (team.team_id, team)).collect();

    let mut box_scores = Vec::new();
    for matchup in wire.schedule.iter().filter(|m| m.matchup_period_id == period) {
        // Byes have no away side and no box score
        let Some(away) = &matchup.away else {
            continue;
        };
        let home_team = lookup_team(&teams, matchup.home.team_id, league.year)?;
        let away_team = lookup_team(&teams, away.team_id, league.year)?;

        box_scores.push(BoxScore {
            home_team,
            away_team,
            home_score: matchup.home.score(week, multi_week),
            away_score: away.score(week, multi_week),
            home_lineup: matchup.home.lineup(week, context),
            away_lineup: away.lineup(week, context),
        });
    }
    Ok(box_scores)
}

fn lookup_team(teams: &HashMap<u32, &Team>, team_id: u32, year: u16) -> Result<Team> {
    teams
        .get(&team_id)
        .map(|team| (*team).clone())
        .ok_or(ProviderError::UnknownTeam { team_id, year })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLeague {
    #[serde(default)]
    settings: WireSettings,
    #[serde(default)]
    status: WireStatus,
    #[serde(default)]
    teams: Vec<WireTeam>,
    #[serde(default)]
    members: Vec<WireMember>,
    #[serde(default)]
    schedule: Vec<WireMatchup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSettings {
    #[serde(default)]
    name: String,
    #[serde(default)]
    schedule_settings: WireScheduleSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireScheduleSettings {
    /// Matchup period id to the scoring period ids it spans
    #[serde(default)]
    matchup_periods: HashMap<u8, Vec<u8>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStatus {
    #[serde(default)]
    current_matchup_period: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTeam {
    id: u32,
    #[serde(default)]
    abbrev: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    primary_owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMember {
    id: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMatchup {
    matchup_period_id: u8,
    home: WireMatchupSide,
    #[serde(default)]
    away: Option<WireMatchupSide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMatchupSide {
    team_id: u32,
    #[serde(default)]
    total_points: f64,
    #[serde(default)]
    total_points_live: Option<f64>,
    #[serde(default)]
    points_by_scoring_period: HashMap<u8, f64>,
    #[serde(default)]
    roster_for_current_scoring_period: Option<WireRoster>,
    #[serde(default)]
    roster_for_matchup_period: Option<WireRoster>,
}

#[derive(Debug, Deserialize)]
struct WireBoxScoreResponse {
    #[serde(default)]
    schedule: Vec<WireMatchup>,
}

#[derive(Debug, Deserialize)]
struct WireRoster {
    #[serde(default)]
    entries: Vec<WireRosterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRosterEntry {
    lineup_slot_id: u16,
    player_pool_entry: WirePlayerPoolEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlayerPoolEntry {
    #[serde(default)]
    applied_stat_total: f64,
    player: WirePlayer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlayer {
    full_name: String,
    #[serde(default)]
    default_position_id: u16,
    #[serde(default)]
    pro_team_id: u32,
    #[serde(default)]
    stats: Vec<WireStat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStat {
    #[serde(default)]
    scoring_period_id: u8,
    #[serde(default)]
    stat_source_id: u8,
    #[serde(default)]
    applied_total: f64,
}

#[derive(Debug, Deserialize)]
struct WireProSeason {
    #[serde(default)]
    settings: WireProSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProSettings {
    #[serde(default)]
    pro_teams: Vec<WireProTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProTeam {
    id: u32,
    #[serde(default)]
    abbrev: String,
    #[serde(default)]
    pro_games_by_scoring_period: HashMap<u8, Vec<WireProGame>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProGame {
    home_pro_team_id: u32,
    away_pro_team_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePositionalRatingsResponse {
    #[serde(default)]
    position_against_opponent: WirePositionAgainstOpponent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePositionAgainstOpponent {
    /// Position id to the ratings of every NFL defense against it
    #[serde(default)]
    positional_ratings: HashMap<u16, WirePositionRatings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePositionRatings {
    #[serde(default)]
    ratings_by_opponent: HashMap<u32, WireOpponentRating>,
}

#[derive(Debug, Deserialize)]
struct WireOpponentRating {
    #[serde(default)]
    rank: Option<u32>,
}

impl WirePositionalRatingsResponse {
    fn ranks(self) -> HashMap<(u16, u32), u32> {
        self.position_against_opponent
            .positional_ratings
            .into_iter()
            .flat_map(|(position, ratings)| {
                ratings
                    .ratings_by_opponent
                    .into_iter()
                    .filter_map(move |(team, rating)| rating.rank.map(|rank| ((position, team), rank)))
            })
            .collect()
    }
}

/// NFL schedule of one season
#[derive(Debug, Default)]
struct ProSchedule {
    /// Pro team id to its upper-case abbreviation
    abbreviations: HashMap<u32, String>,
    /// (scoring week, pro team id) to the opposing pro team id
    opponents: HashMap<(u8, u32), u32>,
}

impl From<WireProSeason> for ProSchedule {
    fn from(wire: WireProSeason) -> Self {
        let mut schedule = ProSchedule::default();
        for team in wire.settings.pro_teams {
            for (week, games) in &team.pro_games_by_scoring_period {
                for game in games {
                    let opponent = if game.home_pro_team_id == team.id {
                        game.away_pro_team_id
                    } else {
                        game.home_pro_team_id
                    };
                    schedule.opponents.insert((*week, team.id), opponent);
                }
            }
            schedule.abbreviations.insert(team.id, team.abbrev.to_uppercase());
        }
        schedule
    }
}

/// Opponent lookups for the lineups of one scoring week
#[derive(Debug, Default)]
struct ProContext {
    week: u8,
    schedule: Arc<ProSchedule>,
    ratings: HashMap<(u16, u32), u32>,
}

impl ProContext {
    /// Opponent abbreviation and that defense's rank against the player's position
    fn opponent_of(&self, player: &WirePlayer) -> (Option<String>, Option<u32>) {
        let Some(&opponent) = self.schedule.opponents.get(&(self.week, player.pro_team_id)) else {
            return (None, None);
        };
        (
            self.schedule.abbreviations.get(&opponent).cloned(),
            self.ratings.get(&(player.default_position_id, opponent)).copied(),
        )
    }
}

impl WireLeague {
    fn into_league(self, league_id: u64, year: u16) -> League {
        let owners: HashMap<String, String> =
            self.members.into_iter().map(|member| (member.id, member.display_name)).collect();

        let teams = self
            .teams
            .into_iter()
            .map(|team| {
                let name = team.display_name();
                Team {
                    team_id: team.id,
                    owner: team.primary_owner.as_ref().and_then(|id| owners.get(id).cloned()),
                    abbreviation: team.abbrev,
                    name,
                }
            })
            .collect();

        let schedule = self
            .schedule
            .iter()
            .map(|matchup| ScheduledMatchup {
                matchup_period: matchup.matchup_period_id,
                home_team_id: matchup.home.team_id,
                away_team_id: matchup.away.as_ref().map(|away| away.team_id),
                home_score: matchup.home.total_points,
                away_score: matchup.away.as_ref().map_or(0.0, |away| away.total_points),
            })
            .collect();

        let matchup_periods: BTreeMap<u8, Vec<u8>> =
            self.settings.schedule_settings.matchup_periods.into_iter().collect();

        League {
            league_id,
            year,
            name: self.settings.name,
            current_week: self.status.current_matchup_period,
            teams,
            schedule,
            matchup_periods,
        }
    }
}

impl WireTeam {
    fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let location = self.location.as_deref().unwrap_or("").trim();
        let nickname = self.nickname.as_deref().unwrap_or("").trim();
        match (location.is_empty(), nickname.is_empty()) {
            (true, true) => format!("Team {}", self.id),
            (false, true) => location.to_string(),
            (true, false) => nickname.to_string(),
            (false, false) => format!("{location} {nickname}"),
        }
    }
}

impl WireMatchupSide {
    /// Points for scoring week `week`; a multi-week period keeps one total per week
    fn score(&self, week: u8, multi_week: bool) -> f64 {
        let weekly = if multi_week { self.points_by_scoring_period.get(&week).copied() } else { None };
        weekly.or(self.total_points_live).unwrap_or(self.total_points)
    }

    fn lineup(&self, week: u8, context: &ProContext) -> Vec<PlayerStat> {
        let roster = self
            .roster_for_current_scoring_period
            .as_ref()
            .or(self.roster_for_matchup_period.as_ref());
        let Some(roster) = roster else {
            return Vec::new();
        };

        roster
            .entries
            .iter()
            .map(|entry| {
                let player = &entry.player_pool_entry.player;
                let points = player
                    .stat_total(week, STAT_SOURCE_ACTUAL)
                    .unwrap_or(entry.player_pool_entry.applied_stat_total);
                let (pro_opponent, opponent_pos_rank) = context.opponent_of(player);
                PlayerStat {
                    name: player.full_name.clone(),
                    position: position_name(player.default_position_id).to_string(),
                    slot: slot_name(entry.lineup_slot_id).to_string(),
                    points,
                    projected_points: player.stat_total(week, STAT_SOURCE_PROJECTED).unwrap_or(0.0),
                    pro_opponent,
                    opponent_pos_rank,
                }
            })
            .collect()
    }
}

impl WirePlayer {
    fn stat_total(&self, week: u8, source: u8) -> Option<f64> {
        self.stats
            .iter()
            .find(|stat| stat.scoring_period_id == week && stat.stat_source_id == source)
            .map(|stat| stat.applied_total)
    }
}

/// Player default position id to abbreviation
fn position_name(id: u16) -> &'static str {
    match id {
        1 => "QB",
        2 => "RB",
        3 => "WR",
        4 => "TE",
        5 => "K",
        7 => "P",
        9 => "DT",
        10 => "DE",
        11 => "LB",
        12 => "CB",
        13 => "S",
        14 => "HC",
        16 => "D/ST",
        _ => "UNK",
    }
}

/// Lineup slot id to abbreviation
fn slot_name(id: u16) -> &'static str {
    match id {
        0 => "QB",
        1 => "TQB",
        2 => "RB",
        3 => "RB/WR",
        4 => "WR",
        5 => "WR/TE",
        6 => "TE",
        7 => "OP",
        8 => "DT",
        9 => "DE",
        10 => "LB",
        11 => "DL",
        12 => "CB",
        13 => "S",
        14 => "DB",
        15 => "DP",
        16 => "D/ST",
        17 => "K",
        18 => "P",
        19 => "HC",
        20 => "BE",
        21 => "IR",
        23 => "RB/WR/TE",
        24 => "ER",
        _ => "UNK",
    }
}
