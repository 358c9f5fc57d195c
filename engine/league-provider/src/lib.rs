//! League Data Provider
//!
//! Supplies the raw fantasy football entities consumed by the dashboard: the league
//! handle for a season, weekly power rankings and weekly box scores. Two sources are
//! available: the ESPN fantasy read API and JSON season snapshots on disk.

pub mod config;
pub mod error;
pub mod espn;
pub mod models;
pub mod power;
pub mod provider;
pub mod snapshot;

pub use config::{ProviderConfig, ProviderKind};
pub use error::{ProviderError, Result};
pub use espn::EspnProvider;
pub use models::*;
pub use power::compute_power_rankings;
pub use provider::{connect, LeagueDataProvider};
pub use snapshot::{SeasonSnapshot, SnapshotProvider};
