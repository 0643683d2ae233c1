//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Send markdown notifications to push, chat-bot and webhook providers
#[derive(Parser, Debug)]
#[command(name = "pushrelay")]
#[command(about = "Send markdown notifications to push, chat-bot and webhook providers")]
#[command(long_about = "
pushrelay sends one markdown message to one of about twenty push providers
(Bark, ServerChan, DingTalk, WeCom, Telegram, ntfy, Pushover and more) or to
any webhook URL, and prints the provider's response as JSON.

EXAMPLES:
    # Send to Bark
    pushrelay send bark -t DEVICE_KEY -T 'Deploy' -m 'Release **v1.2** is live'

    # Pipe content from another command
    git log -1 --format=%B | pushrelay send telegram -t 'BOT_TOKEN#CHAT_ID'

    # POST to an ad-hoc webhook, or GET with a :GET suffix
    pushrelay send 'https://hooks.example.com/notify:GET' -m 'hello'

    # Use credentials stored in [profiles.ops] of the configuration file
    pushrelay send --profile ops -m 'disk almost full'

    # Show the request that would be sent without sending it
    pushrelay send ntfy -t alerts -m 'test' --dry-run

    # List channels and validate configuration
    pushrelay channels
    pushrelay --config /etc/pushrelay.toml check
")]
#[command(version = crate::clap_long_version())]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered `config/` directory.
    /// The file must exist and be readable.
    ///
    /// Example: --config /etc/pushrelay/production.toml
    #[arg(short, long, global = true, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{environment}.toml` layer is loaded.
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Log level override
    ///
    /// Takes precedence over the configuration file and --verbose/--quiet.
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one notification
    ///
    /// Content comes from --message (alias --content), --file, or standard input (in that order).
    /// The provider's decoded response, or an error envelope, is printed to stdout.
    /// Exit code is 0 when the provider accepted the message and 1 otherwise.
    Send(SendArgs),

    /// List supported channels and their aliases
    Channels {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and stored profiles, then exit
    Check,
}

/// Arguments of the send command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SendArgs {
    /// Channel name (e.g. bark, wecombot) or webhook URL with optional :GET/:POST suffix
    #[arg(value_name = "CHANNEL", value_parser = super::validation::validate_channel)]
    pub channel: Option<String>,

    /// Provider token; compound tokens use '#' separators
    #[arg(short, long, env = "PUSHRELAY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Message title; derived from the first line of the content when omitted
    #[arg(short = 'T', long)]
    pub title: Option<String>,

    /// Markdown content
    #[arg(
        short,
        long = "message",
        visible_alias = "content",
        value_name = "TEXT",
        conflicts_with = "file"
    )]
    pub message: Option<String>,

    /// Read markdown content from a file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Provider options as JSON, e.g. '{"bark":{"sound":"alarm"}}'
    #[arg(short, long, value_name = "JSON", value_parser = super::validation::validate_options_json)]
    pub options: Option<serde_json::Value>,

    /// Use channel, token and options stored under [profiles.<NAME>]
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Build the provider request and print it instead of sending
    #[arg(long)]
    pub dry_run: bool,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Checks argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Send(args) = &self.command {
            if args.channel.is_none() && args.profile.is_none() {
                return Err("A channel or --profile is required".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
        .to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn send_args(cli: Cli) -> SendArgs {
        match cli.command {
            Commands::Send(args) => args,
            other => panic!("Expected Send command, got {:?}", other),
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["pushrelay", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_arguments_shows_help() {
        let err = Cli::try_parse_from(["pushrelay"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn test_send_command() {
        let cli = Cli::try_parse_from([
            "pushrelay", "send", "bark", "-t", "key", "-T", "Deploy", "-m", "done",
            "-o", r#"{"bark":{"sound":"alarm"}}"#,
        ])
        .unwrap();
        let args = send_args(cli);
        assert_eq!(args.channel.as_deref(), Some("bark"));
        assert_eq!(args.token.as_deref(), Some("key"));
        assert_eq!(args.title.as_deref(), Some("Deploy"));
        assert_eq!(args.message.as_deref(), Some("done"));
        assert_eq!(args.options.unwrap()["bark"]["sound"], "alarm");
        assert!(!args.dry_run);
    }

    #[test]
    fn test_send_rejects_bad_options_json() {
        let err = Cli::try_parse_from(["pushrelay", "send", "bark", "-o", "{not json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_message_conflicts_with_file() {
        let err = Cli::try_parse_from(["pushrelay", "send", "bark", "-m", "x", "-f", "msg.md"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_content_alias() {
        let cli = Cli::try_parse_from(["pushrelay", "send", "ntfy", "--content", "disk full"])
            .unwrap();
        assert_eq!(send_args(cli).message.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pushrelay", "channels", "--json", "-v", "--env", "prod"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.env, Some(Environment::Production));
        assert!(matches!(cli.command, Commands::Channels { json: true }));
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["pushrelay", "--verbose", "--quiet", "check"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_validate_requires_channel_or_profile() {
        let cli = Cli::try_parse_from(["pushrelay", "send", "-m", "x"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["pushrelay", "send", "--profile", "ops"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(String::from(LogLevel::Warn), "warn");
        assert_eq!(
            crate::config::Environment::from(Environment::Staging),
            crate::config::Environment::Staging
        );
    }
}
