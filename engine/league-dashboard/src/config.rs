//! Dashboard configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then environment
//! variables prefixed with `FFDASH__` (`FFDASH__PROVIDER__LEAGUE_ID=1234`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use league_analytics::{Season, Week, WeekRange};
use league_provider::ProviderConfig;

use crate::error::{DashboardError, Result};

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "league-dashboard.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FFDASH";

/// Main dashboard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// League data provider
    pub provider: ProviderConfig,

    /// Selector defaults
    pub defaults: DefaultsConfig,

    /// Output settings
    pub display: DisplayConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Initial selector values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub year: u16,
    pub rankings_week: u8,
    pub start_week: u8,
    pub end_week: u8,
    pub matchups_week: u8,
    /// Bars in the top scorers chart
    pub top_players: usize,
}

/// Output format for rendered views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub format: OutputFormat,

    /// Colour table output
    pub color: bool,

    /// Width of the longest bar in text charts
    pub chart_width: usize,

    /// Print lineups on matchup cards
    pub show_lineups: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,

    /// Log file path (if None, logs go to stderr)
    pub file: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            year: 2025,
            rankings_week: 13,
            start_week: 1,
            end_week: 18,
            matchups_week: 12,
            top_players: 20,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            color: true,
            chart_width: 40,
            show_lineups: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}

impl DefaultsConfig {
    pub fn season(&self) -> Result<Season> {
        Ok(Season::new(self.year)?)
    }

    pub fn rankings_week(&self) -> Result<Week> {
        Ok(Week::new(self.rankings_week)?)
    }

    pub fn matchups_week(&self) -> Result<Week> {
        Ok(Week::new(self.matchups_week)?)
    }

    pub fn week_range(&self) -> Result<WeekRange> {
        Ok(WeekRange::new(self.start_week, self.end_week)?)
    }
}

/// Load configuration from defaults, an optional file and environment variables.
///
/// An explicit `path` must exist; otherwise `league-dashboard.toml` is read only when
/// present in the working directory.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    dotenv::dotenv().ok();

    let defaults = config::Config::try_from(&DashboardConfig::default())?;
    let mut builder = config::Config::builder().add_source(defaults);

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(DashboardError::Config(format!(
                    "Configuration file not found: {:?}",
                    path
                )));
            }
            tracing::debug!("Loading configuration from file: {:?}", path);
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            builder = builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false));
        }
    }

    let config: DashboardConfig = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &DashboardConfig) -> Result<()> {
    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(DashboardError::Config(format!(
                "Invalid log level: {}",
                config.logging.level
            )))
        }
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => {
            return Err(DashboardError::Config(format!(
                "Invalid log format: {}",
                config.logging.format
            )))
        }
    }

    config
        .provider
        .validate()
        .map_err(|e| DashboardError::Config(e.to_string()))?;

    config.defaults.season()?;
    config.defaults.rankings_week()?;
    config.defaults.matchups_week()?;
    config.defaults.week_range()?;

    if config.defaults.top_players == 0 {
        return Err(DashboardError::Config("top_players must be at least 1".to_string()));
    }

    if config.display.chart_width == 0 {
        return Err(DashboardError::Config("chart_width must be at least 1".to_string()));
    }

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_to_file(config: &DashboardConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_provider::ProviderKind;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashboardConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.defaults.year, 2025);
        assert_eq!(config.defaults.rankings_week, 13);
        assert_eq!(config.defaults.matchups_week, 12);
        assert_eq!(config.defaults.top_players, 20);
    }

    #[test]
    fn test_invalid_logging_rejected() {
        let mut config = DashboardConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(validate_config(&config), Err(DashboardError::Config(_))));

        let mut config = DashboardConfig::default();
        config.logging.format = "xml".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        let mut config = DashboardConfig::default();
        config.defaults.start_week = 10;
        config.defaults.end_week = 4;
        assert!(matches!(
            validate_config(&config),
            Err(DashboardError::InvalidParameters(_))
        ));

        let mut config = DashboardConfig::default();
        config.defaults.year = 2010;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.toml");

        let mut config = DashboardConfig::default();
        config.provider.kind = ProviderKind::Snapshot;
        config.provider.snapshot_dir = dir.path().join("snapshots");
        config.defaults.year = 2023;
        config.display.show_lineups = true;
        save_to_file(&config, &path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.provider.kind, ProviderKind::Snapshot);
        assert_eq!(loaded.defaults.year, 2023);
        assert!(loaded.display.show_lineups);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[defaults]\nrankings_week = 5\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.defaults.rankings_week, 5);
        assert_eq!(loaded.defaults.matchups_week, 12);
        assert_eq!(loaded.provider.league_id, ProviderConfig::default().league_id);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }
}
