//! Send command handler
//!
//! Resolves channel, token and options from the arguments and an optional
//! stored profile, reads the content, dispatches, and prints the outcome.

use std::io::{self, IsTerminal, Read, Write};
use std::sync::Arc;

use serde_json::{Map, Value, json};

use super::write_json;
use crate::cli::executor::CommandStatus;
use crate::cli::parser::SendArgs;
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::external::{RecordingTransport, Transport};
use crate::services::notifications::{
    Dispatcher, NotificationOutcome, NotificationRequest, ProviderOptions,
};

/// Handler for the send command
pub struct SendCommandHandler {
    config: Settings,
    transport: Option<Arc<dyn Transport>>,
}

impl SendCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Send through `transport` instead of an HTTP client built from
    /// the `[http]` settings.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Execute the send command, writing the outcome JSON to `out`
    ///
    /// # Errors
    /// Unknown profiles, unreadable content files and HTTP client setup
    /// failures. Provider and validation failures are reported through the
    /// printed outcome and a `Failure` status instead.
    pub async fn execute<W: Write>(&self, args: &SendArgs, out: &mut W) -> AppResult<CommandStatus> {
        let (channel, request) = self.prepare(args)?;

        if args.dry_run {
            return self.dry_run(&channel, request, out).await;
        }

        let dispatcher = match &self.transport {
            Some(transport) => Dispatcher::new(Arc::clone(transport)),
            None => Dispatcher::http(&self.config.http)?,
        };

        let outcome = dispatcher.dispatch(&channel, request).await;
        write_json(out, &outcome)?;

        Ok(if outcome.is_delivered() {
            CommandStatus::Success
        } else {
            CommandStatus::Failure
        })
    }

    /// Build requests against a recording transport and print them.
    ///
    /// Replies are canned `200 {}` bodies, so multi-step providers stop at
    /// the first step that needs real data from the provider.
    async fn dry_run<W: Write>(
        &self,
        channel: &str,
        request: NotificationRequest,
        out: &mut W,
    ) -> AppResult<CommandStatus> {
        let recorder = Arc::new(RecordingTransport::new());
        let dispatcher = Dispatcher::new(recorder.clone());
        let outcome = dispatcher.dispatch(channel, request).await;

        let requests: Vec<Value> = recorder.requests().iter().map(|r| r.describe()).collect();
        let report = json!({
            "dry_run": true,
            "channel": outcome.channel(),
            "requests": requests,
            "outcome": outcome.to_json(),
        });
        write_json(out, &report)?;

        Ok(match &outcome {
            NotificationOutcome::Failed { error, .. } if error.is_usage_error() => {
                CommandStatus::Failure
            }
            _ => CommandStatus::Success,
        })
    }

    fn prepare(&self, args: &SendArgs) -> AppResult<(String, NotificationRequest)> {
        let profile = args
            .profile
            .as_deref()
            .map(|name| self.config.profile(name))
            .transpose()?;

        let channel = args
            .channel
            .clone()
            .or_else(|| profile.map(|p| p.channel.clone()))
            .ok_or_else(|| AppError::missing_field("channel"))?;

        let token = args
            .token
            .clone()
            .or_else(|| profile.map(|p| p.token.clone()))
            .unwrap_or_default();

        let options = resolve_options(profile.map(|p| &p.options), args.options.as_ref())?;

        tracing::debug!(
            channel = %channel,
            profile = args.profile.as_deref(),
            dry_run = args.dry_run,
            "Preparing notification"
        );

        let mut request = NotificationRequest::new(token, read_content(args)?).with_options(options);
        if let Some(title) = args.title.as_deref().filter(|t| !t.trim().is_empty()) {
            request = request.with_title(title);
        }

        Ok((channel, request))
    }
}

/// Content from `--message`, then `--file`, then piped stdin.
///
/// An interactive stdin yields empty content, which the provider reports as
/// a missing field.
fn read_content(args: &SendArgs) -> AppResult<String> {
    if let Some(message) = &args.message {
        return Ok(message.clone());
    }

    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .map(|content| trim_trailing_newlines(&content))
            .map_err(|e| {
                AppError::validation("file", format!("cannot read '{}': {}", path.display(), e))
            });
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut content = String::new();
    stdin
        .lock()
        .read_to_string(&mut content)
        .map_err(|e| AppError::validation("content", format!("cannot read stdin: {}", e)))?;
    Ok(trim_trailing_newlines(&content))
}

fn trim_trailing_newlines(content: &str) -> String {
    content.trim_end_matches(['\n', '\r']).to_string()
}

/// Deep-merges the raw `--options` document onto the profile options.
///
/// Only keys present in `overrides` replace profile values; null values keep
/// the profile's. The result is deserialized once, after merging.
fn resolve_options(
    base: Option<&ProviderOptions>,
    overrides: Option<&Value>,
) -> AppResult<ProviderOptions> {
    let Some(overrides) = overrides else {
        return Ok(base.cloned().unwrap_or_default());
    };

    let mut merged = match base {
        Some(base) => {
            serde_json::to_value(base).map_err(|e| AppError::Internal { source: e.into() })?
        }
        None => Value::Object(Map::new()),
    };
    merge_json(&mut merged, overrides.clone());
    serde_json::from_value(merged)
        .map_err(|e| AppError::validation("options", format!("Invalid provider options: {}", e)))
}

fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    continue;
                }
                merge_json(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}
