//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file and environment configuration
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way the CLI asks for it
    ///
    /// `--config` switches to single-file mode and `--env` replaces the
    /// environment read from `PUSHRELAY_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        if let Some(ref path) = cli.config {
            loader = loader.with_config_file(path);
        }

        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Precedence: `--log-level`, then `--verbose`/`--quiet`, then the file.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        Self::apply_global_overrides(&mut config, cli);

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
        if let Some(level) = cli.log_level {
            config.logger.level = level.into();
        } else if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::{ENV_LOCK, EnvGuard};
    use clap::Parser;

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default())
            .merge_cli_args(&cli)
            .unwrap()
    }

    #[test]
    fn test_configuration_merger_new() {
        let base_config = Settings::default();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_merge_without_flags_keeps_file_level() {
        assert_eq!(merge(&["pushrelay", "check"]).logger.level, "info");
    }

    #[test]
    fn test_merge_verbose_and_quiet() {
        assert_eq!(merge(&["pushrelay", "--verbose", "check"]).logger.level, "debug");
        assert_eq!(merge(&["pushrelay", "check", "-q"]).logger.level, "error");
    }

    #[test]
    fn test_log_level_overrides_verbose() {
        let settings = merge(&["pushrelay", "--verbose", "--log-level", "warn", "check"]);
        assert_eq!(settings.logger.level, "warn");
    }

    #[test]
    fn test_merge_revalidates() {
        let mut base = Settings::default();
        base.http.timeout = 0;
        let cli = Cli::try_parse_from(["pushrelay", "check"]).unwrap();
        let err = ConfigurationMerger::new(base).merge_cli_args(&cli).unwrap_err();
        assert_eq!(err.key(), "http.timeout");
    }

    #[test]
    fn test_from_cli_loads_config_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(
            file.path(),
            "[http]\ntimeout = 12\n\n[profiles.ops]\nchannel = \"ntfy\"\ntoken = \"alerts\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "pushrelay",
            "--config",
            file.path().to_str().unwrap(),
            "--env",
            "test",
            "check",
        ])
        .unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert_eq!(merger.config().http.timeout, 12);
        assert_eq!(merger.config().profile("ops").unwrap().channel, "ntfy");
    }
}
