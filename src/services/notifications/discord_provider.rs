//! Discord webhook provider. Discord answers `204 No Content` on success.

use serde_json::{Value, json};

use super::provider::{NotificationProvider, NotificationRequest, parse_url};
use super::validator::{is_http_url, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;

const WEBHOOK_API: &str = "https://discord.com/api/webhooks";

/// Discord provider
///
/// The token is the full webhook URL or its `id/token` tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscordProvider;

impl NotificationProvider for DiscordProvider {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let token = request.token.trim();
        let url = if is_http_url(token) {
            parse_url("token", token)?
        } else {
            parse_url(
                "token",
                &format!("{}/{}", WEBHOOK_API, token.trim_start_matches('/')),
            )?
        };

        let mut body = json!({ "content": request.render().markdown_with_title() });
        if let Some(options) = &request.options.discord {
            if let Some(username) = &options.username {
                body["username"] = Value::String(username.clone());
            }
            if let Some(avatar_url) = &options.avatar_url {
                body["avatar_url"] = Value::String(avatar_url.clone());
            }
        }

        Ok(ProviderRequest::post(url).json(body))
    }
}
