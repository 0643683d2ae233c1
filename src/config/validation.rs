//! Configuration validation logic
//!
//! Each settings section checks its own values; `Settings::validate` runs them
//! all and returns the first failure.

use url::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{ChannelProfile, FileSettings, HttpConfig, LoggerSettings, Settings};
use crate::logger::LoggerConfig;

/// Proxy schemes reqwest understands with the enabled features
const VALID_PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

impl HttpConfig {
    /// Validate HTTP client configuration
    ///
    /// # Validation Rules
    /// - Timeouts must be greater than 0
    /// - User agent must not be empty
    /// - Proxy, when set, must be an absolute URL with a supported scheme
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::validation(
                "http.timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "http.connect_timeout",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::validation(
                "http.user_agent",
                "User agent cannot be empty.",
            ));
        }

        if let Some(proxy) = self.proxy.as_deref().filter(|p| !p.is_empty()) {
            let valid = Url::parse(proxy)
                .map(|url| VALID_PROXY_SCHEMES.contains(&url.scheme()) && url.has_host())
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::ValidationError {
                    field: "http.proxy".to_string(),
                    message: format!(
                        "Invalid proxy URL '{}'. Expected scheme://host[:port] with scheme one of: {}",
                        proxy,
                        VALID_PROXY_SCHEMES.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        self.parse_format().map(|_| ())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Level must be a level name or a valid filter directive
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        let candidate = LoggerConfig::default().with_level(self.level.clone());
        if let Err(e) = candidate.filter() {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: e.to_string(),
            });
        }

        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        Ok(())
    }
}

impl ChannelProfile {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.channel.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("profiles.{}.channel", name),
                message: "Channel is required.".to_string(),
            });
        }
        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http.validate()?;
        self.logger.validate()?;
        for (name, profile) in &self.profiles {
            profile.validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ConsoleSettings;
    use crate::services::notifications::ProviderOptions;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    // ========================================================================
    // HttpConfig validation tests
    // ========================================================================

    #[test]
    fn test_http_config_valid() {
        assert!(HttpConfig::default().validate().is_ok());
    }

    #[test]
    fn test_http_config_zero_timeouts() {
        let config = HttpConfig {
            timeout: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "http.timeout");

        let config = HttpConfig {
            connect_timeout: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "http.connect_timeout");
    }

    #[test]
    fn test_http_config_empty_user_agent() {
        let config = HttpConfig {
            user_agent: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "http.user_agent");
    }

    #[test]
    fn test_http_config_proxy() {
        for proxy in ["http://127.0.0.1:3128", "socks5://localhost:1080", ""] {
            let config = HttpConfig {
                proxy: Some(proxy.to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "proxy should be valid: {}", proxy);
        }

        for proxy in ["127.0.0.1:3128", "ftp://proxy.local", "not a url"] {
            let config = HttpConfig {
                proxy: Some(proxy.to_string()),
                ..Default::default()
            };
            assert_eq!(field_of(config.validate().unwrap_err()), "http.proxy");
        }
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid_levels() {
        for level in ["trace", "debug", "INFO", "Warn", "pushrelay=debug"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "Level should be valid: {}", level);
        }
    }

    #[test]
    fn test_logger_settings_invalid_level() {
        let settings = LoggerSettings {
            level: "pushrelay=chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_logger_settings_file_rules() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.file.path");

        let settings = LoggerSettings {
            file: FileSettings {
                format: "yaml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.file.format");
    }

    #[test]
    fn test_logger_settings_needs_output() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger");
    }

    // ========================================================================
    // Settings validation tests
    // ========================================================================

    #[test]
    fn test_settings_default_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_profile_without_channel() {
        let mut settings = Settings::default();
        settings.profiles.insert(
            "ops".to_string(),
            ChannelProfile {
                channel: " ".to_string(),
                token: "t".to_string(),
                options: ProviderOptions::default(),
            },
        );
        assert_eq!(field_of(settings.validate().unwrap_err()), "profiles.ops.channel");
    }
}
