//! IFTTT Webhooks (Maker) provider.

use serde_json::json;

use super::provider::{NotificationProvider, NotificationRequest, parse_url, path_segment};
use super::validator::{TokenField, TokenSchema, require_fields};
use crate::error::AppResult;
use crate::external::ProviderRequest;

const MAKER_API: &str = "https://maker.ifttt.com/trigger";

/// IFTTT provider
///
/// Token layout: `key#event`. The applet receives the title as `value1`, the
/// body as `value2` and the `value3` option unchanged. The service answers
/// with plain text, so there is no body check.
#[derive(Debug, Clone, Copy, Default)]
pub struct IftttProvider;

impl IftttProvider {
    pub const TOKEN: TokenSchema =
        TokenSchema::new(&[TokenField::required("key"), TokenField::required("event")]);
}

impl NotificationProvider for IftttProvider {
    fn name(&self) -> &'static str {
        "ifttt"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let parts = Self::TOKEN.parse(&request.token)?;
        let url = parse_url(
            "token",
            &format!(
                "{}/{}/with/key/{}",
                MAKER_API,
                path_segment(parts.require("event")?),
                path_segment(parts.require("key")?)
            ),
        )?;
        let message = request.render();
        let value3 = request
            .options
            .ifttt
            .as_ref()
            .and_then(|o| o.value3.clone())
            .unwrap_or_default();

        Ok(ProviderRequest::post(url).json(json!({
            "value1": message.title,
            "value2": message.text,
            "value3": value3,
        })))
    }
}
