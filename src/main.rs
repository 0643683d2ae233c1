use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pushrelay::cli::{self, Cli};

/// Exit code for configuration, logger and argument errors
const USAGE_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(USAGE_ERROR)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = cli::load_and_merge_config(&cli).context("Failed to load configuration")?;
    cli::init_logger_from_settings(&settings).context("Failed to initialize logger")?;

    tracing::debug!(
        app = %settings.application.name,
        version = pushrelay::pkg_version(),
        profiles = settings.profiles.len(),
        "Configuration loaded"
    );

    let status = cli::execute_command(&cli, settings).await?;
    Ok(status.exit_code())
}
