//! Dashboard error types

use league_analytics::ParamError;
use league_provider::ProviderError;
use thiserror::Error;

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors surfaced to the user by the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Rejected selector values; no provider call was made
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParamError),

    /// The league data provider failed; cached views are untouched
    #[error("Upstream failure: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    /// Malformed interactive command
    #[error("{0}")]
    Usage(String),
}

impl From<config::ConfigError> for DashboardError {
    fn from(err: config::ConfigError) -> Self {
        DashboardError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DashboardError {
    fn from(err: toml::ser::Error) -> Self {
        DashboardError::Config(err.to_string())
    }
}

impl DashboardError {
    /// True for errors caused by user input rather than the data source
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DashboardError::InvalidParameters(_) | DashboardError::Usage(_))
    }
}
