//! Telegram Bot API provider.
//!
//! Messages are sent with `parse_mode = MarkdownV2`, which rejects any
//! unescaped reserved character, so both title and body go through
//! [`text::escape_markdown_v2`].

use serde_json::{Value, json};

use super::provider::{NotificationProvider, NotificationRequest, expect_flag, parse_url};
use super::validator::{TokenField, TokenSchema, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;
use crate::text;

const BOT_API: &str = "https://api.telegram.org";

/// Telegram provider
///
/// Token layout: `bot_token#chat_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramProvider;

impl TelegramProvider {
    pub const TOKEN: TokenSchema = TokenSchema::new(&[
        TokenField::required("bot_token"),
        TokenField::required("chat_id"),
    ]);

    fn message_text(request: &NotificationRequest) -> String {
        let message = request.render();
        let body = text::escape_markdown_v2(&message.text);
        if message.title_derived && message.text == message.plain {
            body
        } else {
            format!("*{}*\n\n{}", text::escape_markdown_v2(&message.title), body)
        }
    }
}

impl NotificationProvider for TelegramProvider {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let parts = Self::TOKEN.parse(&request.token)?;
        let options = request.options.telegram.clone().unwrap_or_default();

        let api = options
            .api_base
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(BOT_API)
            .trim()
            .trim_end_matches('/');
        let url = parse_url(
            "api_base",
            &format!("{}/bot{}/sendMessage", api, parts.require("bot_token")?),
        )?;

        Ok(ProviderRequest::post(url).json(json!({
            "chat_id": parts.require("chat_id")?,
            "text": Self::message_text(request),
            "parse_mode": "MarkdownV2",
            "disable_notification": options.disable_notification,
            "disable_web_page_preview": options.disable_web_page_preview,
        })))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_flag(self.name(), body, "ok", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::options::{ProviderOptions, TelegramOptions};

    #[test]
    fn test_build_request() {
        let request = NotificationRequest::new("123:ABC#-100200", "# Build 1.2\ndone!");
        let outbound = TelegramProvider.build_request(&request).unwrap();
        assert_eq!(
            outbound.url.as_str(),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
        let body = outbound.json_body().unwrap();
        assert_eq!(body["chat_id"], "-100200");
        assert_eq!(body["parse_mode"], "MarkdownV2");
        assert_eq!(body["text"], "*Build 1\\.2*\n\ndone\\!");
    }

    #[test]
    fn test_single_line_is_not_repeated() {
        let request = NotificationRequest::new("bot#1", "all good");
        let outbound = TelegramProvider.build_request(&request).unwrap();
        assert_eq!(outbound.json_body().unwrap()["text"], "all good");
    }

    #[test]
    fn test_custom_api_base() {
        let options = ProviderOptions {
            telegram: Some(TelegramOptions {
                api_base: Some("https://tg.example.com/".to_string()),
                disable_notification: true,
                ..TelegramOptions::default()
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new("bot#1", "x").with_options(options);
        let outbound = TelegramProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), "https://tg.example.com/botbot/sendMessage");
        assert_eq!(outbound.json_body().unwrap()["disable_notification"], true);
    }

    #[test]
    fn test_missing_chat_id() {
        let request = NotificationRequest::new("123:ABC", "x");
        let err = TelegramProvider.build_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "chat_id is required");
    }

    #[test]
    fn test_check_response() {
        assert!(TelegramProvider.check_response(&json!({"ok": true, "result": {}})).is_ok());
        assert!(TelegramProvider
            .check_response(&json!({"ok": false, "description": "Bad Request: chat not found"}))
            .is_err());
    }
}
