//! PushPlus providers: the current service and the older hxtrip mirror.

use serde_json::{Value, json};

use super::provider::{NotificationProvider, NotificationRequest, expect_code, parse_url};
use super::validator::require_fields;
use crate::error::AppResult;
use crate::external::ProviderRequest;

const PUSHPLUS_API: &str = "https://www.pushplus.plus/send";
const HXTRIP_API: &str = "http://pushplus.hxtrip.com/send";

#[derive(Debug, Clone, Copy, Default)]
pub struct PushPlusProvider;

impl NotificationProvider for PushPlusProvider {
    fn name(&self) -> &'static str {
        "pushplus"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let message = request.render();
        let options = request.options.pushplus.clone().unwrap_or_default();

        let mut body = json!({
            "token": request.token.trim(),
            "title": message.title,
            "content": request.content,
            "template": options.template.as_deref().unwrap_or("markdown"),
        });
        if let Some(topic) = options.topic {
            body["topic"] = Value::String(topic);
        }
        if let Some(channel) = options.channel {
            body["channel"] = Value::String(channel);
        }

        Ok(ProviderRequest::post(parse_url("url", PUSHPLUS_API)?).json(body))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "code", 200)
    }
}

/// Legacy PushPlus deployment at pushplus.hxtrip.com
#[derive(Debug, Clone, Copy, Default)]
pub struct PushPlusHxtripProvider;

impl NotificationProvider for PushPlusHxtripProvider {
    fn name(&self) -> &'static str {
        "pushplushxtrip"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let message = request.render();

        Ok(ProviderRequest::post(parse_url("url", HXTRIP_API)?).json(json!({
            "token": request.token.trim(),
            "title": message.title,
            "content": request.content,
        })))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "code", 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifications::options::{ProviderOptions, PushPlusOptions};

    #[test]
    fn test_pushplus_body() {
        let options = ProviderOptions {
            pushplus: Some(PushPlusOptions {
                topic: Some("ops".to_string()),
                ..PushPlusOptions::default()
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new("tok", "# Disk\n90% used").with_options(options);
        let outbound = PushPlusProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), PUSHPLUS_API);
        assert_eq!(
            outbound.json_body(),
            Some(&json!({
                "token": "tok",
                "title": "Disk",
                "content": "# Disk\n90% used",
                "template": "markdown",
                "topic": "ops",
            }))
        );
    }

    #[test]
    fn test_hxtrip_body() {
        let request = NotificationRequest::new("tok", "hello").with_title("Hi");
        let outbound = PushPlusHxtripProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), HXTRIP_API);
        assert_eq!(
            outbound.json_body(),
            Some(&json!({"token": "tok", "title": "Hi", "content": "hello"}))
        );
    }

    #[test]
    fn test_check_response() {
        assert!(PushPlusProvider.check_response(&json!({"code": 200, "msg": "ok"})).is_ok());
        let err = PushPlusHxtripProvider
            .check_response(&json!({"code": 903, "msg": "invalid token"}))
            .unwrap_err();
        assert_eq!(err.kind(), "provider_call");
    }
}
