//! League Dashboard Library
//!
//! Presentation layer and application glue for the fantasy football dashboard:
//! configuration, logging, explicit session state, rendering, the one-shot CLI and the
//! interactive session.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod service;
pub mod session;
pub mod state;
pub mod views;

pub use config::{load_config, DashboardConfig, OutputFormat};
pub use error::{DashboardError, Result};
pub use logging::initialize_logging;
pub use service::Dashboard;
pub use session::InteractiveSession;
pub use state::{SessionState, ViewKind};

/// Load configuration from files and environment variables
pub fn load_configuration(path: Option<&std::path::Path>) -> Result<DashboardConfig> {
    config::load_config(path)
}
