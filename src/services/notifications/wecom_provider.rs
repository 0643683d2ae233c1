//! WeCom (WeChat Work) providers.
//!
//! The group robot is a single webhook call. The self-built application
//! needs two calls: `gettoken` for a short-lived access token, then
//! `message/send` authorised with it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::options::BotMessageType;
use super::provider::{
    NotificationProvider, NotificationRequest, deliver, expect_code, parse_url,
};
use super::validator::{TokenField, TokenSchema, is_http_url, require_fields};
use crate::error::{AppError, AppResult};
use crate::external::{ProviderRequest, Transport};

const QYAPI_BASE: &str = "https://qyapi.weixin.qq.com/cgi-bin";
const MESSAGE_SEND_TIMEOUT: Duration = Duration::from_secs(10);

fn message_body(request: &NotificationRequest, msgtype: BotMessageType) -> Value {
    let message = request.render();
    match msgtype {
        BotMessageType::Markdown => json!({
            "msgtype": "markdown",
            "markdown": { "content": message.markdown_with_title() },
        }),
        BotMessageType::Text => json!({
            "msgtype": "text",
            "text": { "content": message.full_text() },
        }),
    }
}

/// WeCom group robot provider
///
/// The token is the robot `key` or the full webhook URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeComBotProvider;

impl NotificationProvider for WeComBotProvider {
    fn name(&self) -> &'static str {
        "wecombot"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let token = request.token.trim();
        let msgtype = request
            .options
            .wecombot
            .as_ref()
            .map(|o| o.msgtype)
            .unwrap_or_default();

        let outbound = if is_http_url(token) {
            ProviderRequest::post(parse_url("token", token)?)
        } else {
            let url = parse_url("url", &format!("{}/webhook/send", QYAPI_BASE))?;
            ProviderRequest::post(url).query("key", token)
        };

        Ok(outbound.json(message_body(request, msgtype)))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "errcode", 0)
    }
}

/// WeCom application provider
///
/// Token layout: `corpid#secret#agentid[#touser]`. Recipients default to
/// the `touser` option and then to `@all`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeComAppProvider;

impl WeComAppProvider {
    pub const TOKEN: TokenSchema = TokenSchema::new(&[
        TokenField::required("corpid"),
        TokenField::required("secret"),
        TokenField::required("agentid"),
        TokenField::optional("touser"),
    ]);

    fn agent_id(raw: &str) -> AppResult<i64> {
        raw.parse()
            .map_err(|_| AppError::validation("agentid", format!("'{}' is not a number", raw)))
    }

    fn recipients(request: &NotificationRequest, token_touser: Option<&str>) -> String {
        token_touser
            .map(str::to_string)
            .or_else(|| {
                request
                    .options
                    .wecomapp
                    .as_ref()
                    .and_then(|o| o.touser.clone())
                    .filter(|t| !t.trim().is_empty())
            })
            .unwrap_or_else(|| "@all".to_string())
    }

    /// Second-stage request authorised by `access_token`
    fn message_request(
        &self,
        request: &NotificationRequest,
        access_token: &str,
    ) -> AppResult<ProviderRequest> {
        let parts = Self::TOKEN.parse(&request.token)?;
        let agent_id = Self::agent_id(parts.require("agentid")?)?;
        let msgtype = request
            .options
            .wecomapp
            .as_ref()
            .map(|o| o.msgtype)
            .unwrap_or(BotMessageType::Text);

        let mut body = message_body(request, msgtype);
        body["touser"] = Value::String(Self::recipients(request, parts.get("touser")));
        body["agentid"] = Value::from(agent_id);

        let url = parse_url("url", &format!("{}/message/send", QYAPI_BASE))?;
        Ok(ProviderRequest::post(url)
            .query("access_token", access_token)
            .json(body)
            .timeout(MESSAGE_SEND_TIMEOUT))
    }
}

#[async_trait]
impl NotificationProvider for WeComAppProvider {
    fn name(&self) -> &'static str {
        "wecomapp"
    }

    /// Validates the whole request and returns the `gettoken` stage.
    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let parts = Self::TOKEN.parse(&request.token)?;
        Self::agent_id(parts.require("agentid")?)?;

        let url = parse_url("url", &format!("{}/gettoken", QYAPI_BASE))?;
        Ok(ProviderRequest::get(url)
            .query("corpid", parts.require("corpid")?)
            .query("corpsecret", parts.require("secret")?))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "errcode", 0)
    }

    async fn send(
        &self,
        request: &NotificationRequest,
        transport: &dyn Transport,
    ) -> AppResult<Value> {
        let token_request = self.build_request(request)?;
        let token_body = deliver(transport, self.name(), token_request).await?;
        self.check_response(&token_body)?;

        let access_token = token_body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::provider_call(self.name(), None, "gettoken returned no access_token")
            })?;

        let send_request = self.message_request(request, access_token)?;
        let body = deliver(transport, self.name(), send_request).await?;
        self.check_response(&body)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{ProviderResponse, RecordingTransport};
    use crate::services::notifications::options::{
        ProviderOptions, WeComAppOptions, WeComBotOptions,
    };

    #[test]
    fn test_bot_key_markdown() {
        let request = NotificationRequest::new("k-123", "**up**").with_title("Status");
        let outbound = WeComBotProvider.build_request(&request).unwrap();
        assert_eq!(outbound.query_value("key").as_deref(), Some("k-123"));
        assert_eq!(
            outbound.json_body(),
            Some(&json!({"msgtype": "markdown", "markdown": {"content": "## Status\n\n**up**"}}))
        );
    }

    #[test]
    fn test_bot_url_text() {
        let options = ProviderOptions {
            wecombot: Some(WeComBotOptions {
                msgtype: BotMessageType::Text,
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new(
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=zz",
            "line one\n\nline two",
        )
        .with_options(options);
        let outbound = WeComBotProvider.build_request(&request).unwrap();
        assert_eq!(outbound.query_value("key").as_deref(), Some("zz"));
        assert_eq!(outbound.json_body().unwrap()["text"]["content"], "line one\n\nline two");
    }

    #[test]
    fn test_app_token_schema() {
        let request = NotificationRequest::new("ww1#secret", "hello");
        let err = WeComAppProvider.build_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "agentid is required");

        let request = NotificationRequest::new("ww1#secret#abc", "hello");
        let err = WeComAppProvider.build_request(&request).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn test_app_two_stage_send() {
        let transport = RecordingTransport::new()
            .reply(ProviderResponse::json(
                200,
                &json!({"errcode": 0, "access_token": "AT-1", "expires_in": 7200}),
            ))
            .reply(ProviderResponse::json(200, &json!({"errcode": 0, "errmsg": "ok"})));
        let options = ProviderOptions {
            wecomapp: Some(WeComAppOptions {
                touser: Some("bob".to_string()),
                ..WeComAppOptions::default()
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new("ww1#s3cret#1000002", "# Backup\ncompleted")
            .with_options(options);

        let body = WeComAppProvider.send(&request, &transport).await.unwrap();
        assert_eq!(body["errmsg"], "ok");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        let token_request = &requests[0];
        assert!(token_request.url.as_str().ends_with("/cgi-bin/gettoken?corpid=ww1&corpsecret=s3cret"));

        let send_request = &requests[1];
        assert_eq!(send_request.query_value("access_token").as_deref(), Some("AT-1"));
        assert_eq!(send_request.timeout, Some(MESSAGE_SEND_TIMEOUT));
        let sent = send_request.json_body().unwrap();
        assert_eq!(sent["touser"], "bob");
        assert_eq!(sent["agentid"], 1000002);
        assert_eq!(sent["msgtype"], "text");
        assert_eq!(sent["text"]["content"], "Backup\ncompleted");
    }

    #[tokio::test]
    async fn test_app_first_stage_failure_is_surfaced() {
        let transport = RecordingTransport::new().reply(ProviderResponse::json(
            200,
            &json!({"errcode": 40013, "errmsg": "invalid corpid"}),
        ));
        let request = NotificationRequest::new("bad#s#1#alice", "hello");

        let err = WeComAppProvider.send(&request, &transport).await.unwrap_err();
        assert_eq!(err.kind(), "provider_call");
        assert!(err.to_string().contains("invalid corpid"));
        assert_eq!(transport.call_count(), 1);
    }
}
