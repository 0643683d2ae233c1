//! Feishu (Lark) custom bot provider.

use serde_json::{Value, json};

use super::provider::{
    NotificationProvider, NotificationRequest, expect_code, parse_url, path_segment,
};
use super::validator::{is_http_url, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;

const HOOK_API: &str = "https://open.feishu.cn/open-apis/bot/v2/hook";

/// Feishu bot provider
///
/// The token is the hook id or the full hook URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeishuProvider;

impl NotificationProvider for FeishuProvider {
    fn name(&self) -> &'static str {
        "feishu"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let token = request.token.trim();
        let url = if is_http_url(token) {
            parse_url("token", token)?
        } else {
            parse_url("token", &format!("{}/{}", HOOK_API, path_segment(token)))?
        };

        Ok(ProviderRequest::post(url).json(json!({
            "msg_type": "text",
            "content": { "text": request.render().full_text() },
        })))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "code", 0)?;
        expect_code(self.name(), body, "StatusCode", 0)
    }
}
