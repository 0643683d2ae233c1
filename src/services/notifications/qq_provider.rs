//! QQ delivery: go-cqhttp and ATRI bot endpoints plus the Qmsg relay.

use serde_json::{Value, json};

use super::provider::{
    NotificationProvider, NotificationRequest, expect_code, expect_flag, parse_url, path_segment,
};
use super::validator::{is_http_url, require_fields};
use crate::error::{AppError, AppResult};
use crate::external::ProviderRequest;
use crate::text;

const QMSG_API: &str = "https://qmsg.zendee.cn";

fn endpoint_url(token: &str) -> AppResult<reqwest::Url> {
    let token = token.trim();
    if !is_http_url(token) {
        return Err(AppError::validation(
            "token",
            "expected the bot endpoint URL, e.g. http://127.0.0.1:5700/send_msg",
        ));
    }
    parse_url("token", token)
}

/// go-cqhttp (OneBot) HTTP API provider
///
/// The token is the full `send_msg` endpoint, with `access_token` in its
/// query when the bot requires one.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoCqHttpProvider;

impl NotificationProvider for GoCqHttpProvider {
    fn name(&self) -> &'static str {
        "gocqhttp"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let url = endpoint_url(&request.token)?;

        let mut body = json!({ "message": request.render().full_text() });
        if let Some(options) = &request.options.gocqhttp {
            if let Some(message_type) = &options.message_type {
                body["message_type"] = Value::String(message_type.clone());
            }
            if let Some(user_id) = options.user_id {
                body["user_id"] = Value::from(user_id);
            }
            if let Some(group_id) = options.group_id {
                body["group_id"] = Value::from(group_id);
            }
        }

        Ok(ProviderRequest::post(url).json(body))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        if body.get("status").and_then(Value::as_str) == Some("failed") {
            let reason = body
                .get("wording")
                .or_else(|| body.get("msg"))
                .and_then(Value::as_str)
                .unwrap_or("status=failed");
            return Err(AppError::provider_call(self.name(), None, reason));
        }
        expect_code(self.name(), body, "retcode", 0)
    }
}

/// ATRI bot provider; the message travels as a query parameter
#[derive(Debug, Clone, Copy, Default)]
pub struct AtriProvider;

impl NotificationProvider for AtriProvider {
    fn name(&self) -> &'static str {
        "atri"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let url = endpoint_url(&request.token)?;
        Ok(ProviderRequest::get(url).query("message", &request.render().full_text()))
    }
}

/// Qmsg provider
///
/// Qmsg refuses messages carrying links, addresses or e-mails, so the text is
/// passed through [`text::sanitize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QmsgProvider;

impl NotificationProvider for QmsgProvider {
    fn name(&self) -> &'static str {
        "qmsg"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let options = request.options.qmsg.clone().unwrap_or_default();
        let route = if options.group { "group" } else { "send" };
        let url = parse_url(
            "token",
            &format!("{}/{}/{}", QMSG_API, route, path_segment(request.token.trim())),
        )?;

        let mut form = vec![("msg", text::sanitize(&request.render().full_text()))];
        if let Some(qq) = options.qq.filter(|q| !q.trim().is_empty()) {
            form.push(("qq", qq));
        }

        Ok(ProviderRequest::post(url).form(form))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_flag(self.name(), body, "success", true)
    }
}
