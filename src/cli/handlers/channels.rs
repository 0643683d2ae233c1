//! Channels command handler

use std::io::Write;
use std::sync::Arc;

use serde_json::{Value, json};

use super::write_json;
use crate::cli::executor::CommandStatus;
use crate::error::{AppError, AppResult};
use crate::external::RecordingTransport;
use crate::services::notifications::Dispatcher;

const WEBHOOK_HINT: &str =
    "Any other http(s) URL is sent as a webhook; append :GET or :POST to choose the method.";

/// Lists the registered channels and their aliases
pub struct ChannelsCommandHandler {
    dispatcher: Dispatcher,
}

impl ChannelsCommandHandler {
    pub fn new() -> Self {
        // Listing never sends, so no HTTP client is built.
        Self {
            dispatcher: Dispatcher::new(Arc::new(RecordingTransport::new())),
        }
    }

    pub fn execute<W: Write>(&self, as_json: bool, out: &mut W) -> AppResult<CommandStatus> {
        let channels = self.dispatcher.channels();

        if as_json {
            let listing: Vec<Value> = channels
                .iter()
                .map(|name| json!({ "name": name, "aliases": self.dispatcher.aliases(name) }))
                .collect();
            write_json(out, &listing)?;
            return Ok(CommandStatus::Success);
        }

        let mut text = String::new();
        for name in channels {
            let aliases = self.dispatcher.aliases(name);
            if aliases.is_empty() {
                text.push_str(&format!("{}\n", name));
            } else {
                text.push_str(&format!("{:<14} (aliases: {})\n", name, aliases.join(", ")));
            }
        }
        text.push('\n');
        text.push_str(WEBHOOK_HINT);
        text.push('\n');

        out.write_all(text.as_bytes())
            .map_err(|e| AppError::Internal { source: e.into() })?;
        Ok(CommandStatus::Success)
    }
}

impl Default for ChannelsCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
