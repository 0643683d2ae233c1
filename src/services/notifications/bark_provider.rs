//! Bark notification provider implementation.
//!
//! Sends push notifications to iOS devices via the Bark server API. Title and
//! body travel as percent-encoded path segments of a GET request.
//!
//! Bark API Reference: https://github.com/Finb/Bark

use serde_json::Value;

use super::provider::{
    NotificationProvider, NotificationRequest, expect_code, parse_url, path_segment,
};
use super::validator::{is_http_url, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;

const DEFAULT_SERVER: &str = "https://api.day.app";

/// Bark notification provider
///
/// The token is either a device key for the public server or a full
/// `https://host/device_key` URL for a self-hosted one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarkProvider;

impl BarkProvider {
    fn base_url(token: &str) -> String {
        let token = token.trim();
        if is_http_url(token) {
            token.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", DEFAULT_SERVER, path_segment(token))
        }
    }
}

impl NotificationProvider for BarkProvider {
    fn name(&self) -> &'static str {
        "bark"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let message = request.render();

        let raw = format!(
            "{}/{}/{}/",
            Self::base_url(&request.token),
            path_segment(&message.title),
            path_segment(&message.text),
        );
        let mut outbound = ProviderRequest::get(parse_url("token", &raw)?);

        if let Some(options) = &request.options.bark {
            let extras = [
                ("sound", &options.sound),
                ("group", &options.group),
                ("icon", &options.icon),
                ("level", &options.level),
                ("url", &options.url),
            ];
            for (name, value) in extras {
                if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                    outbound = outbound.query(name, value);
                }
            }
        }

        Ok(outbound)
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "code", 200)
    }
}
