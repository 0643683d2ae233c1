//! PushDeer provider, public or self-hosted server.

use serde_json::Value;

use super::provider::{NotificationProvider, NotificationRequest, expect_code, parse_url};
use super::validator::require_fields;
use crate::error::AppResult;
use crate::external::ProviderRequest;

const DEFAULT_SERVER: &str = "https://api2.pushdeer.com";

#[derive(Debug, Clone, Copy, Default)]
pub struct PushDeerProvider;

impl NotificationProvider for PushDeerProvider {
    fn name(&self) -> &'static str {
        "pushdeer"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let server = request
            .options
            .pushdeer
            .as_ref()
            .and_then(|o| o.server.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SERVER);
        let url = parse_url(
            "server",
            &format!("{}/message/push", server.trim().trim_end_matches('/')),
        )?;
        let message = request.render();

        Ok(ProviderRequest::post(url).form([
            ("pushkey", request.token.trim().to_string()),
            ("text", message.title),
            ("desp", request.content.clone()),
            ("type", "markdown".to_string()),
        ]))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "code", 0)
    }
}
