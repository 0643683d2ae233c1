//! ntfy provider.
//!
//! Publishes the markdown body as plain request text; metadata travels in
//! headers as documented at https://docs.ntfy.sh/publish/.

use super::provider::{NotificationProvider, NotificationRequest, parse_url, path_segment};
use super::validator::{is_http_url, require_fields};
use crate::error::{AppError, AppResult};
use crate::external::ProviderRequest;

const DEFAULT_SERVER: &str = "https://ntfy.sh";

/// ntfy provider
///
/// The token is a topic on the configured server or a full topic URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct NtfyProvider;

impl NotificationProvider for NtfyProvider {
    fn name(&self) -> &'static str {
        "ntfy"
    }

    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest> {
        require_fields(request, &["token", "content"])?;
        let token = request.token.trim();
        let options = request.options.ntfy.clone().unwrap_or_default();

        let url = if is_http_url(token) {
            parse_url("token", token)?
        } else {
            let server = options
                .server
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_SERVER);
            parse_url(
                "server",
                &format!(
                    "{}/{}",
                    server.trim().trim_end_matches('/'),
                    path_segment(token)
                ),
            )?
        };

        let message = request.render();
        let mut outbound = ProviderRequest::post(url)
            .header("Title", message.title.as_str())
            .header("Markdown", "yes")
            .text(message.markdown_body());

        if let Some(priority) = options.priority {
            if !(1..=5).contains(&priority) {
                return Err(AppError::validation(
                    "priority",
                    format!("must be between 1 and 5, got {}", priority),
                ));
            }
            outbound = outbound.header("Priority", priority.to_string());
        }
        if !options.tags.is_empty() {
            outbound = outbound.header("Tags", options.tags.join(","));
        }

        Ok(outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::RequestBody;
    use crate::services::notifications::options::{NtfyOptions, ProviderOptions};

    fn header<'a>(outbound: &'a ProviderRequest, name: &str) -> Option<&'a str> {
        outbound
            .headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_topic_with_options() {
        let options = ProviderOptions {
            ntfy: Some(NtfyOptions {
                priority: Some(4),
                tags: vec!["warning".to_string(), "disk".to_string()],
                ..NtfyOptions::default()
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new("alerts", "Disk\nnearly **full**").with_options(options);
        let outbound = NtfyProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), "https://ntfy.sh/alerts");
        assert_eq!(header(&outbound, "Title"), Some("Disk"));
        assert_eq!(header(&outbound, "Priority"), Some("4"));
        assert_eq!(header(&outbound, "Tags"), Some("warning,disk"));
        assert_eq!(outbound.body, RequestBody::Text("nearly **full**".to_string()));
    }

    #[test]
    fn test_explicit_title_keeps_markdown() {
        let request = NotificationRequest::new("https://ntfy.example.com/ops", "**x**").with_title("T");
        let outbound = NtfyProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), "https://ntfy.example.com/ops");
        assert_eq!(outbound.body, RequestBody::Text("**x**".to_string()));
    }

    #[test]
    fn test_topic_is_one_path_segment() {
        let request = NotificationRequest::new("ops?x#y", "hi");
        let outbound = NtfyProvider.build_request(&request).unwrap();
        assert_eq!(outbound.url.as_str(), "https://ntfy.sh/ops%3Fx%23y");
        assert_eq!(outbound.url.query(), None);
    }

    #[test]
    fn test_priority_out_of_range() {
        let options = ProviderOptions {
            ntfy: Some(NtfyOptions {
                priority: Some(9),
                ..NtfyOptions::default()
            }),
            ..ProviderOptions::default()
        };
        let request = NotificationRequest::new("alerts", "x").with_options(options);
        assert_eq!(NtfyProvider.build_request(&request).unwrap_err().kind(), "validation");
    }
}
