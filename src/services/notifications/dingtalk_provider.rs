//! DingTalk custom robot provider.
//!
//! Robot API Reference: https://open.dingtalk.com/document/robots/custom-robot-access

use serde_json::{Value, json};

use super::options::BotMessageType;
use super::provider::{NotificationProvider, NotificationRequest, expect_code, parse_url};
use super::validator::{is_http_url, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;

const ROBOT_API: &str = "https://oapi.dingtalk.com/robot/send";

/// DingTalk robot provider
///
/// Accepts either the robot's `access_token` or its full webhook URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DingTalkProvider;

impl NotificationProvider for DingTalkProvider {
    fn name(&self) -> &'static str {
        "dingtalk"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let token = request.token.trim();
        let options = request.options.dingtalk.clone().unwrap_or_default();
        let message = request.render();

        let outbound = if is_http_url(token) {
            ProviderRequest::post(parse_url("token", token)?)
        } else {
            ProviderRequest::post(parse_url("url", ROBOT_API)?).query("access_token", token)
        };

        let at = json!({
            "atMobiles": options.at_mobiles,
            "isAtAll": options.at_all,
        });
        let body = match options.msgtype {
            BotMessageType::Markdown => json!({
                "msgtype": "markdown",
                "markdown": { "title": message.title, "text": request.content },
                "at": at,
            }),
            BotMessageType::Text => json!({
                "msgtype": "text",
                "text": { "content": message.full_text() },
                "at": at,
            }),
        };

        Ok(outbound.json(body))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "errcode", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::options::{DingTalkOptions, ProviderOptions};

    #[test]
    fn test_access_token() {
        let request = NotificationRequest::new("abc", "## Release\nv1.2 shipped");
        let outbound = DingTalkProvider.build_request(&request).unwrap();
        assert_eq!(outbound.query_value("access_token").as_deref(), Some("abc"));
        let body = outbound.json_body().unwrap();
        assert_eq!(body["msgtype"], "markdown");
        assert_eq!(body["markdown"]["title"], "Release");
        assert_eq!(body["markdown"]["text"], "## Release\nv1.2 shipped");
        assert_eq!(body["at"]["isAtAll"], false);
    }

    #[test]
    fn test_full_url_and_text_message() {
        let options = ProviderOptions {
            dingtalk: Some(DingTalkOptions {
                msgtype: BotMessageType::Text,
                at_mobiles: vec!["13800000000".to_string()],
                at_all: false,
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new(
            "https://oapi.dingtalk.com/robot/send?access_token=xyz",
            "*done*",
        )
        .with_title("Job")
        .with_options(options);
        let outbound = DingTalkProvider.build_request(&request).unwrap();
        assert_eq!(outbound.query_value("access_token").as_deref(), Some("xyz"));
        let body = outbound.json_body().unwrap();
        assert_eq!(body["text"]["content"], "Job\n\ndone");
        assert_eq!(body["at"]["atMobiles"][0], "13800000000");
    }

    #[test]
    fn test_check_response() {
        assert!(DingTalkProvider.check_response(&json!({"errcode": 0, "errmsg": "ok"})).is_ok());
        assert!(DingTalkProvider
            .check_response(&json!({"errcode": 310000, "errmsg": "keywords not in content"}))
            .is_err());
    }
}
