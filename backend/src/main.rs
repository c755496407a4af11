// widecol entrypoint
//!
//! Loads configuration, installs logging, opens the configured store and
//! runs one subcommand.

mod logging;

use anyhow::Result;
use clap::Parser;
use log::info;
use widecol::args::Cli;
use widecol::{commands, store};
use widecol_configs::ConnectorConfig;
use widecol_core::WideColumnConnector;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (fallback to defaults when config file missing)
    let mut config = if cli.config.exists() {
        ConnectorConfig::from_file(&cli.config)?
    } else {
        ConnectorConfig::default()
    };
    config.apply_env_overrides()?;
    config.finalize()?;

    // Logging before any other side effects
    logging::init_logging(&config.logging)?;

    info!("widecol v{}", env!("CARGO_PKG_VERSION"));
    if cli.config.exists() {
        info!("Loaded config from: {}", cli.config.display());
    } else {
        info!("Config file {} not found, using defaults", cli.config.display());
    }

    store::check_cli_backend(&config.store)?;
    let client = store::open_store(&config.store)?;
    let connector = WideColumnConnector::new(client);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(cli.command, &connector, &config.store, &mut out)
}
