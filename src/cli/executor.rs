//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use std::io::Write;
use std::process::ExitCode;

use super::handlers::{ChannelsCommandHandler, CheckCommandHandler, SendCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// The command ran but its result is negative (provider rejected the
    /// message, a profile failed the check)
    Failure,
}

impl CommandStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            CommandStatus::Success => ExitCode::SUCCESS,
            CommandStatus::Failure => ExitCode::from(1),
        }
    }
}

/// Execute a CLI command, writing its output to stdout
///
/// # Errors
/// Returns errors from command handlers or argument validation failures
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<CommandStatus> {
    let mut stdout = std::io::stdout().lock();
    let status = execute_command_with_output(cli, settings, &mut stdout).await?;
    stdout
        .flush()
        .map_err(|e| AppError::Internal { source: e.into() })?;
    Ok(status)
}

/// Execute a CLI command, writing its output to `out`
pub async fn execute_command_with_output<W: Write>(
    cli: &Cli,
    settings: Settings,
    out: &mut W,
) -> AppResult<CommandStatus> {
    validate_command_args(cli)?;

    match &cli.command {
        Commands::Send(args) => SendCommandHandler::new(settings).execute(args, out).await,
        Commands::Channels { json } => ChannelsCommandHandler::new().execute(*json, out),
        Commands::Check => CheckCommandHandler::new(settings).execute(out),
    }
}

/// Validate argument combinations before any handler runs
fn validate_command_args(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|msg| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason: msg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    async fn run(args: &[&str]) -> (AppResult<CommandStatus>, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        let status = execute_command_with_output(&cli, Settings::default(), &mut out).await;
        (status, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_execute_channels() {
        let (status, output) = run(&["pushrelay", "channels"]).await;
        assert_eq!(status.unwrap(), CommandStatus::Success);
        assert!(output.contains("wecomapp"));
    }

    #[tokio::test]
    async fn test_execute_check() {
        let (status, output) = run(&["pushrelay", "check"]).await;
        assert_eq!(status.unwrap(), CommandStatus::Success);
        assert!(output.contains("Configuration check completed successfully"));
    }

    #[tokio::test]
    async fn test_execute_send_dry_run() {
        let (status, output) = run(&[
            "pushrelay", "send", "dingtalk", "-t", "abc", "-T", "Build", "-m", "green", "--dry-run",
        ])
        .await;
        assert_eq!(status.unwrap(), CommandStatus::Success);
        let report: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(report["requests"][0]["host"], "oapi.dingtalk.com");
    }

    #[tokio::test]
    async fn test_send_without_channel_or_profile() {
        let (status, output) = run(&["pushrelay", "send", "-m", "hi"]).await;
        match status {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "cli_arguments"),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            format!("{:?}", CommandStatus::Success.exit_code()),
            format!("{:?}", ExitCode::SUCCESS)
        );
        assert_eq!(
            format!("{:?}", CommandStatus::Failure.exit_code()),
            format!("{:?}", ExitCode::from(1))
        );
    }
}
