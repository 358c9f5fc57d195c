//! JSON season snapshots
//!
//! A snapshot holds everything the dashboard needs for one season: the league handle,
//! box scores per week and, optionally, power rankings per week. Snapshots live in a
//! directory as `<year>.json`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, Result};
use crate::models::{BoxScore, League, RankingEntry};
use crate::power::compute_power_rankings;
use crate::provider::LeagueDataProvider;

/// One season of league data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub league: League,

    /// Box scores keyed by week
    #[serde(default)]
    pub box_scores: BTreeMap<u8, Vec<BoxScore>>,

    /// Stored power rankings keyed by week
    #[serde(default)]
    pub power_rankings: BTreeMap<u8, Vec<RankingEntry>>,

    /// When the snapshot was written
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
}

impl SeasonSnapshot {
    /// Create an empty snapshot for a league
    pub fn new(league: League) -> Self {
        Self {
            league,
            box_scores: BTreeMap::new(),
            power_rankings: BTreeMap::new(),
            exported_at: Utc::now(),
        }
    }

    /// File name used inside a snapshot directory
    pub fn file_name(year: u16) -> String {
        format!("{year}.json")
    }

    /// Read a snapshot from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the snapshot into `dir` as `<year>.json`, returning the written path
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(Self::file_name(self.league.year));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).await?;
        info!("Wrote season snapshot for {} to {:?}", self.league.year, path);
        Ok(path)
    }
}

/// Provider backed by season snapshots.
///
/// Each `<year>.json` file is parsed once and then served from memory.
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    dir: Option<PathBuf>,
    seasons: Arc<RwLock<HashMap<u16, Arc<SeasonSnapshot>>>>,
}

impl SnapshotProvider {
    /// Provider reading `<dir>/<year>.json` on demand
    pub fn new(dir: &Path) -> Self {
        Self { dir: Some(dir.to_path_buf()), seasons: Arc::default() }
    }

    /// Provider serving in-memory snapshots only
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = SeasonSnapshot>) -> Self {
        let seasons = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.league.year, Arc::new(snapshot)))
            .collect();
        Self { dir: None, seasons: Arc::new(RwLock::new(seasons)) }
    }

    async fn snapshot(&self, league_id: Option<u64>, year: u16) -> Result<Arc<SeasonSnapshot>> {
        if let Some(snapshot) = self.seasons.read().await.get(&year) {
            return Ok(Arc::clone(snapshot));
        }

        let not_found = || ProviderError::SeasonNotFound { league_id: league_id.unwrap_or(0), year };
        let Some(dir) = &self.dir else {
            return Err(not_found());
        };

        // Concurrent week fetches queue here so the file is parsed once
        let mut seasons = self.seasons.write().await;
        if let Some(snapshot) = seasons.get(&year) {
            return Ok(Arc::clone(snapshot));
        }

        let path = dir.join(SeasonSnapshot::file_name(year));
        if !fs::try_exists(&path).await? {
            return Err(not_found());
        }
        debug!("Loading season snapshot from {:?}", path);
        let snapshot = Arc::new(SeasonSnapshot::load(&path).await?);
        seasons.insert(year, Arc::clone(&snapshot));
        Ok(snapshot)
    }
}

#[async_trait]
impl LeagueDataProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn get_league(&self, year: u16) -> Result<League> {
        let snapshot = self.snapshot(None, year).await?;
        info!(
            "Loaded league {} ({}) with {} teams from snapshot",
            snapshot.league.name,
            year,
            snapshot.league.teams.len()
        );
        Ok(snapshot.league.clone())
    }

    async fn power_rankings(&self, league: &League, week: u8) -> Result<Vec<RankingEntry>> {
        let snapshot = self.snapshot(Some(league.league_id), league.year).await?;
        match snapshot.power_rankings.get(&week) {
            Some(stored) => Ok(stored.clone()),
            None => Ok(compute_power_rankings(&snapshot.league, week)),
        }
    }

    async fn box_scores(&self, league: &League, week: u8) -> Result<Vec<BoxScore>> {
        let snapshot = self.snapshot(Some(league.league_id), league.year).await?;
        let box_scores = snapshot.box_scores.get(&week).cloned().unwrap_or_default();
        if box_scores.is_empty() {
            warn!("No box scores in snapshot for {} week {}", league.year, week);
        }
        Ok(box_scores)
    }
}
