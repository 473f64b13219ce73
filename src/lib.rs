pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::ConfigService;
use crate::interfaces::cli::{dispatch, Cli};

pub use crate::domain::error::{AppError, Result};

/// Parse the command line, load configuration and run one command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut service = ConfigService::new();
    if let Some(path) = &cli.config {
        service = service.with_file(path);
    }
    let config = service.load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    debug!(command = ?cli.command, "Dispatching command");
    dispatch(cli.command, &config).await
}
