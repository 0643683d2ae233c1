//! Pushover provider.
//!
//! Pushover API Reference: https://pushover.net/api

use serde_json::Value;

use super::provider::{NotificationProvider, NotificationRequest, expect_code, parse_url};
use super::validator::{TokenField, TokenSchema, require_fields};
use crate::error::{AppError, AppResult};
use crate::external::ProviderRequest;

const MESSAGES_API: &str = "https://api.pushover.net/1/messages.json";

/// Pushover provider
///
/// Token layout: `app_token#user_key`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushoverProvider;

impl PushoverProvider {
    pub const TOKEN: TokenSchema = TokenSchema::new(&[
        TokenField::required("app_token"),
        TokenField::required("user_key"),
    ]);
}

impl NotificationProvider for PushoverProvider {
    fn name(&self) -> &'static str {
        "pushover"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let parts = Self::TOKEN.parse(&request.token)?;
        let options = request.options.pushover.clone().unwrap_or_default();
        let message = request.render();

        let mut form = vec![
            ("token", parts.require("app_token")?.to_string()),
            ("user", parts.require("user_key")?.to_string()),
            ("title", message.title),
            ("message", message.text),
        ];
        if let Some(priority) = options.priority {
            // Emergency priority needs retry/expire parameters that are not exposed.
            if !(-2..=1).contains(&priority) {
                return Err(AppError::validation(
                    "priority",
                    format!("must be between -2 and 1, got {}", priority),
                ));
            }
            form.push(("priority", priority.to_string()));
        }
        let extras = [("sound", options.sound), ("device", options.device), ("url", options.url)];
        for (name, value) in extras {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                form.push((name, value));
            }
        }

        Ok(ProviderRequest::post(parse_url("url", MESSAGES_API)?).form(form))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "status", 1)
    }
}
