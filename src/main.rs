//! Mason - buildpack runner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use mason::cli::{Cli, Commands};
use mason::config::{Config, ConfigManager};
use mason::error::MasonResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> MasonResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::locate(cli.config.clone());
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Detect(args) => mason::cli::commands::detect(args, &config).await,
        Commands::Compile(args) => mason::cli::commands::compile(args, &config).await,
        Commands::Info(args) => mason::cli::commands::info(args, &config).await,
        Commands::Buildpacks(args) => mason::cli::commands::buildpacks(args, &config).await,
        Commands::Config(args) => {
            mason::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug. Logs go to stderr so stdout stays
/// reserved for command output and buildpack output.
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("mason=warn"),
        1 => EnvFilter::new("mason=info"),
        _ => EnvFilter::new("mason=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
