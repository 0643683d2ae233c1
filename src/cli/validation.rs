//! CLI argument validation functions
//!
//! Custom value parsers for arguments clap cannot validate on its own.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::services::notifications::ProviderOptions;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate a channel identifier: a name or a URL, without whitespace
pub fn validate_channel(channel_str: &str) -> Result<String, String> {
    let channel = channel_str.trim();

    if channel.is_empty() {
        return Err("Channel cannot be empty".to_string());
    }

    if channel.chars().any(char::is_whitespace) {
        return Err(format!("Channel cannot contain whitespace: '{}'", channel_str));
    }

    Ok(channel.to_string())
}

/// Check the `--options` JSON document against the provider option shapes
///
/// The top level must be an object keyed by channel name. The raw document is
/// returned so that only the keys actually given override stored profile
/// options.
pub fn validate_options_json(options_str: &str) -> Result<serde_json::Value, String> {
    let value: serde_json::Value = serde_json::from_str(options_str)
        .map_err(|e| format!("Options must be valid JSON: {}", e))?;

    if !value.is_object() {
        return Err("Options must be a JSON object keyed by channel name".to_string());
    }

    ProviderOptions::deserialize(&value).map_err(|e| format!("Invalid provider options: {}", e))?;
    Ok(value)
}
