use async_trait::async_trait;
use tracing::info;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::Result;
use crate::espn::EspnProvider;
use crate::models::{BoxScore, League, RankingEntry};
use crate::snapshot::SnapshotProvider;

/// Source of raw league entities.
///
/// Calls are single blocking fetches from the caller's point of view; implementations
/// do not retry.
#[async_trait]
pub trait LeagueDataProvider: Send + Sync {
    /// Short name for log lines
    fn name(&self) -> &'static str;

    /// Load the league handle for a season
    async fn get_league(&self, year: u16) -> Result<League>;

    /// Power-ranking scores for one week, highest first
    async fn power_rankings(&self, league: &League, week: u8) -> Result<Vec<RankingEntry>>;

    /// Box scores for every matchup of one week
    async fn box_scores(&self, league: &League, week: u8) -> Result<Vec<BoxScore>>;
}

/// Build the provider selected by configuration
pub fn connect(config: &ProviderConfig) -> Result<Box<dyn LeagueDataProvider>> {
    config.validate()?;
    let provider: Box<dyn LeagueDataProvider> = match config.kind {
        ProviderKind::Espn => Box::new(EspnProvider::new(config.clone())?),
        ProviderKind::Snapshot => Box::new(SnapshotProvider::new(&config.snapshot_dir)),
    };
    info!("Using {} league data provider", provider.name());
    Ok(provider)
}
