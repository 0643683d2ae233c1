//! WxPusher provider. Content is rendered to HTML (`contentType = 2`).

use serde_json::{Value, json};

use super::provider::{NotificationProvider, NotificationRequest, expect_flag, parse_url};
use super::validator::{TokenField, TokenSchema, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;
use crate::text;

const SEND_API: &str = "https://wxpusher.zjiecode.com/api/send/message";
const CONTENT_TYPE_HTML: u8 = 2;

/// WxPusher provider
///
/// Token layout: `app_token#uid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WxPusherProvider;

impl WxPusherProvider {
    pub const TOKEN: TokenSchema =
        TokenSchema::new(&[TokenField::required("app_token"), TokenField::required("uid")]);
}

impl NotificationProvider for WxPusherProvider {
    fn name(&self) -> &'static str {
        "wxpusher"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let parts = Self::TOKEN.parse(&request.token)?;
        let options = request.options.wxpusher.clone().unwrap_or_default();
        let message = request.render();

        let mut body = json!({
            "appToken": parts.require("app_token")?,
            "content": text::to_html(&message.markdown_with_title()),
            "summary": message.title,
            "contentType": CONTENT_TYPE_HTML,
            "uids": [parts.require("uid")?],
        });
        if !options.topic_ids.is_empty() {
            body["topicIds"] = json!(options.topic_ids);
        }
        if let Some(url) = options.url {
            body["url"] = Value::String(url);
        }

        Ok(ProviderRequest::post(parse_url("url", SEND_API)?).json(body))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_flag(self.name(), body, "success", true)
    }
}
