//! Webhook notification provider implementation.
//!
//! Sends the message to an arbitrary URL taken from the `webhook` options,
//! either as query parameters (GET) or as a JSON body (POST).

use serde_json::{Map, Value};

use super::options::WebhookMethod;
use super::provider::{NotificationProvider, NotificationRequest, parse_url};
use super::validator::require_fields;
use crate::error::{AppError, AppResult};
use crate::external::ProviderRequest;

/// Generic webhook provider
///
/// The token is ignored; target, method and headers come from
/// [`WebhookOptions`](super::options::WebhookOptions). The title is only sent
/// when given explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookProvider;

impl NotificationProvider for WebhookProvider {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["content"])?;
        let options = request
            .options
            .webhook
            .as_ref()
            .filter(|o| !o.url.trim().is_empty())
            .ok_or_else(|| AppError::missing_field("url"))?;

        let url = parse_url("url", &options.url)?;
        let title = request.field("title");

        let mut outbound = match options.method {
            WebhookMethod::Get => {
                let mut get = ProviderRequest::get(url);
                if let Some(title) = title {
                    get = get.query("title", title);
                }
                get.query("content", &request.content)
            }
            WebhookMethod::Post => {
                let mut body = Map::new();
                if let Some(title) = title {
                    body.insert("title".to_string(), Value::from(title));
                }
                body.insert("content".to_string(), Value::from(request.content.as_str()));
                ProviderRequest::post(url).json(Value::Object(body))
            }
        };

        for (name, value) in &options.headers {
            outbound = outbound.header(name.as_str(), value.as_str());
        }

        Ok(outbound)
    }
}
