use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stockchat::cli::Cli;
use stockchat::config::Config;
use stockchat::utils::error::report_error;

/// `RUST_LOG` wins; otherwise warnings only, or everything from this crate with `--debug`
fn init_tracing(debug: bool) {
    let default = if debug { "stockchat=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match &cli.config {
        Some(config_path) => Config::load_custom(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?,
        None => {
            Config::ensure_config_exists()?;
            Config::load()?
        }
    };

    if !config.general.color {
        colored::control::set_override(false);
    }

    if let Err(e) = cli.command.execute(config).await {
        report_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
