//! ServerChan notification provider.
//!
//! Two API generations share this channel: Turbo keys start with `sct` and
//! post `title`, the legacy service posts `text`.

use serde_json::Value;

use super::provider::{
    NotificationProvider, NotificationRequest, expect_code, parse_url, path_segment,
};
use super::validator::require_fields;
use crate::error::AppResult;
use crate::external::ProviderRequest;

const TURBO_API: &str = "https://sctapi.ftqq.com";
const LEGACY_API: &str = "https://sc.ftqq.com";

#[derive(Debug, Clone, Copy, Default)]
pub struct ServerChanProvider;

impl ServerChanProvider {
    fn is_turbo_key(token: &str) -> bool {
        token
            .get(..3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("sct"))
    }
}

impl NotificationProvider for ServerChanProvider {
    fn name(&self) -> &'static str {
        "serverchan"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["serverchain", "sct"]
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let token = request.token.trim();
        let message = request.render();

        let (base, title_field) = if Self::is_turbo_key(token) {
            (TURBO_API, "title")
        } else {
            (LEGACY_API, "text")
        };
        let url = parse_url("token", &format!("{}/{}.send", base, path_segment(token)))?;

        Ok(ProviderRequest::post(url).form([
            (title_field, message.title),
            ("desp", request.content.clone()),
        ]))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "code", 0)?;
        expect_code(self.name(), body, "errno", 0)
    }
}
