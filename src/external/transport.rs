//! Transport-independent request descriptors and the seam that executes them.
//!
//! Adapters only ever build a [`ProviderRequest`]; a [`Transport`] turns it
//! into an actual HTTP exchange. [`HttpTransport`] is the reqwest-backed
//! implementation used in production.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde_json::{Value, json};

use super::client::HTTP_CLIENT;
use crate::error::{AppError, AppResult};

/// Body encoding of an outbound request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Text(String),
}

/// Fully described outbound provider request
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub method: Method,
    /// Target URL with any query parameters already encoded
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Per-request timeout overriding the client default
    pub timeout: Option<Duration>,
}

impl ProviderRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a percent-encoded query parameter to the URL
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the first query parameter called `name`
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Value of the first form field called `name`
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(pairs) => pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// JSON body, if the request carries one
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// JSON description of the request, used by dry runs.
    ///
    /// Query strings are omitted because several providers carry credentials
    /// there; the path is kept.
    pub fn describe(&self) -> Value {
        let body = match &self.body {
            RequestBody::Empty => Value::Null,
            RequestBody::Json(value) => value.clone(),
            RequestBody::Form(pairs) => pairs
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<serde_json::Map<_, _>>()
                .into(),
            RequestBody::Text(text) => Value::String(text.clone()),
        };
        json!({
            "method": self.method.as_str(),
            "host": self.url.host_str(),
            "path": self.url.path(),
            "headers": self.headers.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            "body": body,
            "timeout_secs": self.timeout.map(|t| t.as_secs()),
        })
    }

    fn encode_form(pairs: &[(String, String)]) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

/// Raw provider response: status plus undecoded body text
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON, falling back to a JSON string for text
    /// bodies and `null` for empty ones.
    pub fn decode(&self) -> Value {
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(self.body.clone()))
    }

    /// Body truncated for error messages
    pub fn preview(&self) -> String {
        const LIMIT: usize = 200;
        match self.body.char_indices().nth(LIMIT) {
            Some((idx, _)) => format!("{}...", &self.body[..idx]),
            None => self.body.clone(),
        }
    }
}

/// Executes provider requests.
///
/// Implementations must not interpret provider semantics; status and body
/// are handed back untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` on behalf of `provider`
    ///
    /// # Errors
    /// `AppError::Transport` when no response could be obtained
    async fn execute(&self, provider: &str, request: ProviderRequest)
    -> AppResult<ProviderResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(HTTP_CLIENT.clone())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        provider: &str,
        request: ProviderRequest,
    ) -> AppResult<ProviderResponse> {
        let start = Instant::now();
        let host = request.url.host_str().unwrap_or_default().to_string();

        let mut builder = self.client.request(request.method.clone(), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(pairs) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(ProviderRequest::encode_form(&pairs)),
            RequestBody::Text(text) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text),
        };

        let response = builder.send().await.map_err(|source| AppError::Transport {
            provider: provider.to_string(),
            source,
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| AppError::Transport {
            provider: provider.to_string(),
            source,
        })?;

        tracing::debug!(
            provider,
            host = %host,
            status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Provider responded"
        );

        Ok(ProviderResponse { status, body })
    }
}
