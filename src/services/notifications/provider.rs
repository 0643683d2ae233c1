//! Core notification provider trait and types.
//!
//! Every provider turns a [`NotificationRequest`] into one outbound
//! [`ProviderRequest`]; the provided [`NotificationProvider::send`] takes care
//! of executing it and classifying the response.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::options::ProviderOptions;
use crate::error::{AppError, AppResult};
use crate::external::{ProviderRequest, Transport};
use crate::text;

/// Message to be sent via a notification provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Provider credential: plain key, `#`-separated compound token or URL
    #[serde(default)]
    pub token: String,
    /// Message title; derived from the first content line when absent
    #[serde(default)]
    pub title: Option<String>,
    /// Message body in markdown
    #[serde(default)]
    pub content: String,
    /// Provider-specific options
    #[serde(default)]
    pub options: ProviderOptions,
}

impl NotificationRequest {
    pub fn new(token: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: ProviderOptions) -> Self {
        self.options = options;
        self
    }

    /// Non-blank value of a named field (`token`, `title` or `content`)
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "token" => self.token.as_str(),
            "title" => self.title.as_deref()?,
            "content" => self.content.as_str(),
            _ => return None,
        };
        Some(value).filter(|v| !v.trim().is_empty())
    }

    /// Renders title and plain-text body from the markdown content.
    pub fn render(&self) -> RenderedMessage {
        let plain = text::to_plain_text(&self.content);
        match self.field("title") {
            Some(title) => RenderedMessage {
                title: title.trim().to_string(),
                title_derived: false,
                markdown: self.content.clone(),
                text: plain.clone(),
                plain,
            },
            None => {
                let title = plain.lines().next().unwrap_or_default().trim().to_string();
                let body = text::strip_title(&plain).unwrap_or(&plain).to_string();
                RenderedMessage {
                    title,
                    title_derived: true,
                    markdown: self.content.clone(),
                    text: body,
                    plain,
                }
            }
        }
    }
}

/// Title and body prepared for a provider
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    /// Explicit title, or the first plain-text line of the content
    pub title: String,
    pub title_derived: bool,
    /// Content exactly as supplied
    pub markdown: String,
    /// Plain-text rendering of the whole content
    pub plain: String,
    /// Plain-text body without a derived title line
    pub text: String,
}

impl RenderedMessage {
    /// Title and body as one plain-text block, never repeating a derived title.
    pub fn full_text(&self) -> String {
        if self.title_derived {
            self.plain.clone()
        } else {
            format!("{}\n\n{}", self.title, self.plain)
        }
    }

    /// Markdown without the source line a derived title was taken from.
    ///
    /// Falls back to the whole markdown when nothing follows that line.
    pub fn markdown_body(&self) -> &str {
        if !self.title_derived {
            return &self.markdown;
        }
        self.markdown
            .trim_start()
            .split_once('\n')
            .map(|(_, rest)| rest.trim())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&self.markdown)
    }

    /// Markdown body led by an explicit title as a heading.
    pub fn markdown_with_title(&self) -> String {
        if self.title_derived {
            self.markdown.clone()
        } else {
            format!("## {}\n\n{}", self.title, self.markdown)
        }
    }
}

/// Trait for notification providers (bark, telegram, webhook, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// All providers must be Send + Sync so one dispatcher can be shared across
/// tasks.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Primary channel name, lower case
    fn name(&self) -> &'static str;

    /// Additional channel names resolving to this provider
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Validates `request` and builds the outbound request.
    ///
    /// Multi-stage providers return their first stage here.
    fn build_request(&self, request: &NotificationRequest) -> AppResult<ProviderRequest>;

    /// Inspects a decoded 2xx body for a provider-reported failure
    fn check_response(&self, body: &Value) -> AppResult<()> {
        let _ = body;
        Ok(())
    }

    /// Sends a notification and returns the decoded provider response
    async fn send(
        &self,
        request: &NotificationRequest,
        transport: &dyn Transport,
    ) -> AppResult<Value> {
        let outbound = self.build_request(request)?;
        let body = deliver(transport, self.name(), outbound).await?;
        self.check_response(&body)?;
        Ok(body)
    }
}

/// Executes `request` and decodes the body, rejecting non-2xx statuses.
pub async fn deliver(
    transport: &dyn Transport,
    provider: &str,
    request: ProviderRequest,
) -> AppResult<Value> {
    tracing::debug!(
        provider,
        method = %request.method,
        host = request.url.host_str().unwrap_or_default(),
        "Sending provider request"
    );
    let response = transport.execute(provider, request).await?;
    if !response.is_success() {
        return Err(AppError::provider_call(
            provider,
            Some(response.status),
            format!("HTTP {}: {}", response.status, response.preview()),
        ));
    }
    Ok(response.decode())
}

/// Characters left unescaped by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes `raw` as a single URL path segment.
///
/// Keys and topics interpolated into a provider URL go through here so that
/// `/`, `?` or `#` inside them cannot change the path, query or fragment.
pub fn path_segment(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Parses a URL, reporting failures against `field`
pub fn parse_url(field: &str, raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::validation(field, format!("Invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::validation(
            field,
            format!("URL must use http or https, got '{}'", other),
        )),
    }
}

/// Fails when `body[field]` is an integer other than `expected`.
///
/// A missing field is accepted; several providers omit it on success.
pub fn expect_code(provider: &str, body: &Value, field: &str, expected: i64) -> AppResult<()> {
    match body.get(field).and_then(Value::as_i64) {
        Some(code) if code != expected => Err(AppError::provider_call(
            provider,
            None,
            format!("{}={}: {}", field, code, failure_reason(body)),
        )),
        _ => Ok(()),
    }
}

/// Fails when `body[field]` is a boolean other than `expected`.
pub fn expect_flag(provider: &str, body: &Value, field: &str, expected: bool) -> AppResult<()> {
    match body.get(field).and_then(Value::as_bool) {
        Some(flag) if flag != expected => Err(AppError::provider_call(
            provider,
            None,
            format!("{}={}: {}", field, flag, failure_reason(body)),
        )),
        _ => Ok(()),
    }
}

fn failure_reason(body: &Value) -> String {
    ["msg", "message", "errmsg", "description", "error", "reason", "info"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
