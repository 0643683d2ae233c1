//! Check command handler
//!
//! Validates the loaded configuration and every stored profile without
//! sending anything.

use std::io::Write;

use crate::cli::executor::CommandStatus;
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::services::notifications::Dispatcher;

/// Handler for the check command
pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Validate settings, build the HTTP client, and resolve each profile's
    /// channel.
    ///
    /// Returns `Failure` when a profile names an unknown channel; invalid
    /// settings or an unusable proxy are errors.
    pub fn execute<W: Write>(&self, out: &mut W) -> AppResult<CommandStatus> {
        self.config.validate()?;
        let dispatcher = Dispatcher::http(&self.config.http)?;

        let http = &self.config.http;
        let mut lines = vec![
            "✓ Configuration is valid".to_string(),
            format!(
                "✓ HTTP client: timeout {}s, connect timeout {}s, proxy {}",
                http.timeout,
                http.connect_timeout,
                http.proxy.as_deref().filter(|p| !p.is_empty()).unwrap_or("none")
            ),
            format!("✓ Logger level: {}", self.config.logger.level),
        ];

        let mut failures = 0;
        for (name, profile) in &self.config.profiles {
            match dispatcher.resolve(&profile.channel) {
                Ok(target) => lines.push(format!("✓ Profile {}: {}", name, target.label())),
                Err(e) => {
                    failures += 1;
                    lines.push(format!("✗ Profile {}: {}", name, e));
                }
            }
        }

        let status = if failures == 0 {
            lines.push("Configuration check completed successfully".to_string());
            CommandStatus::Success
        } else {
            lines.push(format!("{} profile(s) failed the check", failures));
            CommandStatus::Failure
        };

        for line in lines {
            writeln!(out, "{}", line).map_err(|e| AppError::Internal { source: e.into() })?;
        }
        Ok(status)
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
