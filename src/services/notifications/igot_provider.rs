//! iGot provider.

use serde_json::{Value, json};

use super::provider::{
    NotificationProvider, NotificationRequest, expect_code, parse_url, path_segment,
};
use super::validator::require_fields;
use crate::error::AppResult;
use crate::external::ProviderRequest;

const IGOT_API: &str = "https://push.hellyw.com";

#[derive(Debug, Clone, Copy, Default)]
pub struct IGotProvider;

impl NotificationProvider for IGotProvider {
    fn name(&self) -> &'static str {
        "igot"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let url = parse_url(
            "token",
            &format!("{}/{}", IGOT_API, path_segment(request.token.trim())),
        )?;
        let message = request.render();

        Ok(ProviderRequest::post(url).json(json!({
            "title": message.title,
            "content": message.text,
        })))
    }

    fn check_response(&self, body: &Value) -> AppResult<()> {
        expect_code(self.name(), body, "ret", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request() {
        let request = NotificationRequest::new("key1", "## Job\nfinished");
        let outbound = IGotProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), "https://push.hellyw.com/key1");
        assert_eq!(
            outbound.json_body(),
            Some(&json!({"title": "Job", "content": "finished"}))
        );
    }

    #[test]
    fn test_check_response() {
        assert!(IGotProvider.check_response(&json!({"ret": 0, "errMsg": ""})).is_ok());
        assert!(IGotProvider.check_response(&json!({"ret": 201, "errMsg": "key invalid"})).is_err());
    }
}
