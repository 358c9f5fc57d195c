//! League Dashboard
//!
//! Entry point for the `league-dashboard` binary. Rendered views go to stdout; logs go to
//! stderr or the configured log file.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use league_dashboard::cli::{Cli, CliHandler, Commands};
use league_dashboard::config::{save_to_file, DashboardConfig};
use league_dashboard::{initialize_logging, load_configuration, Dashboard, InteractiveSession};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { path, force } = &cli.command {
        if path.exists() && !*force {
            anyhow::bail!("{:?} already exists; pass --force to overwrite", path);
        }
        save_to_file(&DashboardConfig::default(), path)
            .with_context(|| format!("Failed to write configuration to {:?}", path))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config =
        load_configuration(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    initialize_logging(&config.logging).context("Failed to initialize logging")?;
    if !config.display.color {
        colored::control::set_override(false);
    }
    info!("Starting League Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let dashboard = Dashboard::new(config).context("Failed to create league data provider")?;

    if cli.command == Commands::Session {
        let mut session = InteractiveSession::new(dashboard)?;
        session.run().await.context("Interactive session failed")?;
        return Ok(());
    }

    let mut handler = CliHandler::new(dashboard);
    match handler.handle_command(cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e.into())
        }
    }
}
