//! Bedtime Stories CLI
//!
#![doc = "Main entry point for the bedtime command."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bedtime_stories::cli::Cli;
use bedtime_stories::commands;
use bedtime_stories::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    tracing::debug!("Using {} store", config.store.store_type);
    commands::handle_command(config, cli.command).await
}

/// Log to stderr so command output on stdout stays clean
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "bedtime_stories=debug"
    } else {
        "bedtime_stories=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
