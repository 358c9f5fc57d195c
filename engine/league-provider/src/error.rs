//! Error types for the league data provider

use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while fetching league data
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredentials(String),

    #[error("Season {year} not found for league {league_id}")]
    SeasonNotFound { league_id: u64, year: u16 },

    #[error("Unknown team id {team_id} in season {year}")]
    UnknownTeam { team_id: u32, year: u16 },

    #[error("Configuration error: {0}")]
    Configuration(String),
}
