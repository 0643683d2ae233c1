//! Join (joaoapps) push provider.

use serde_json::Value;

use super::provider::{NotificationProvider, NotificationRequest, expect_flag, parse_url};
use super::validator::{TokenField, TokenSchema, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;

const SEND_PUSH_API: &str = "https://joinjoaomgcd.appspot.com/_ah/api/messaging/v1/sendPush";
const ALL_DEVICES: &str = "group.all";

/// Join provider
///
/// Token layout: `apikey[#device_id]`; without a device the push goes to
/// every registered device.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinProvider;

impl JoinProvider {
    pub const TOKEN: TokenSchema = TokenSchema::new(&[
        TokenField::required("apikey"),
        TokenField::optional("device_id"),
    ]);
}

impl NotificationProvider for JoinProvider {
    fn name(&self) -> &'static str {
        "join"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let parts = Self::TOKEN.parse(&request.token)?;
        let message = request.render();

        Ok(ProviderRequest::get(parse_url("url", SEND_PUSH_API)?)
            .query("apikey", parts.require("apikey")?)
            .query("deviceId", parts.get("device_id").unwrap_or(ALL_DEVICES))
            .query("title", &message.title)
            .query("text", &message.text))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_flag(self.name(), body, "success", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_to_all_devices() {
        let request = NotificationRequest::new("api1", "Door\nopened");
        let outbound = JoinProvider.build_request(&request).unwrap();
        assert_eq!(outbound.query_value("apikey").as_deref(), Some("api1"));
        assert_eq!(outbound.query_value("deviceId").as_deref(), Some("group.all"));
        assert_eq!(outbound.query_value("title").as_deref(), Some("Door"));
        assert_eq!(outbound.query_value("text").as_deref(), Some("opened"));
    }

    #[test]
    fn test_explicit_device() {
        let request = NotificationRequest::new("api1#phone", "x");
        let outbound = JoinProvider.build_request(&request).unwrap();
        assert_eq!(outbound.query_value("deviceId").as_deref(), Some("phone"));
    }

    #[test]
    fn test_check_response() {
        assert!(JoinProvider.check_response(&json!({"success": true})).is_ok());
        assert!(JoinProvider
            .check_response(&json!({"success": false, "errorMessage": "No device"}))
            .is_err());
    }
}
