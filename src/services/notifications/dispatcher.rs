//! Channel resolution and dispatch.
//!
//! The [`Dispatcher`] owns the provider table and the shared transport. It is
//! the single boundary where provider errors are turned into a
//! [`NotificationOutcome`].

use std::collections::{BTreeSet, HashMap};
use std::error::Error as _;
use std::sync::Arc;

use reqwest::Url;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::bark_provider::BarkProvider;
use super::dingtalk_provider::DingTalkProvider;
use super::discord_provider::DiscordProvider;
use super::feishu_provider::FeishuProvider;
use super::ifttt_provider::IftttProvider;
use super::igot_provider::IGotProvider;
use super::join_provider::JoinProvider;
use super::ntfy_provider::NtfyProvider;
use super::options::{WebhookMethod, WebhookOptions};
use super::provider::{NotificationProvider, NotificationRequest};
use super::pushdeer_provider::PushDeerProvider;
use super::pushover_provider::PushoverProvider;
use super::pushplus_provider::{PushPlusHxtripProvider, PushPlusProvider};
use super::qq_provider::{AtriProvider, GoCqHttpProvider, QmsgProvider};
use super::serverchan_provider::ServerChanProvider;
use super::telegram_provider::TelegramProvider;
use super::validator::is_http_url;
use super::webhook_provider::WebhookProvider;
use super::wecom_provider::{WeComAppProvider, WeComBotProvider};
use super::wxpusher_provider::WxPusherProvider;
use crate::config::HttpConfig;
use crate::error::{AppError, AppResult};
use crate::external::{HttpTransport, Transport, build_client};

/// Every provider shipped with the crate
pub fn builtin_providers() -> Vec<Arc<dyn NotificationProvider>> {
    vec![
        Arc::new(ServerChanProvider),
        Arc::new(PushPlusProvider),
        Arc::new(PushPlusHxtripProvider),
        Arc::new(DingTalkProvider),
        Arc::new(WeComBotProvider),
        Arc::new(WeComAppProvider),
        Arc::new(BarkProvider),
        Arc::new(GoCqHttpProvider),
        Arc::new(AtriProvider),
        Arc::new(PushDeerProvider),
        Arc::new(IGotProvider),
        Arc::new(TelegramProvider),
        Arc::new(FeishuProvider),
        Arc::new(IftttProvider),
        Arc::new(WxPusherProvider),
        Arc::new(DiscordProvider),
        Arc::new(JoinProvider),
        Arc::new(QmsgProvider),
        Arc::new(NtfyProvider),
        Arc::new(PushoverProvider),
        Arc::new(WebhookProvider),
    ]
}

/// What a channel identifier resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    /// Registered provider, by primary name
    Named(&'static str),
    /// Absolute URL used as a generic webhook
    Webhook { url: String, method: WebhookMethod },
}

impl ChannelTarget {
    /// Name used in logs; webhook targets are reduced to their host.
    pub fn label(&self) -> String {
        match self {
            ChannelTarget::Named(name) => (*name).to_string(),
            ChannelTarget::Webhook { url, .. } => Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| format!("webhook:{}", h)))
                .unwrap_or_else(|| "webhook".to_string()),
        }
    }
}

/// Result of one dispatch: the provider body or the error that stopped it
#[derive(Debug)]
pub enum NotificationOutcome {
    Delivered { channel: String, data: Value },
    Failed { channel: String, error: AppError },
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationOutcome::Delivered { .. })
    }

    pub fn channel(&self) -> &str {
        match self {
            NotificationOutcome::Delivered { channel, .. }
            | NotificationOutcome::Failed { channel, .. } => channel,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            NotificationOutcome::Delivered { data, .. } => Some(data),
            NotificationOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            NotificationOutcome::Delivered { .. } => None,
            NotificationOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> AppResult<Value> {
        match self {
            NotificationOutcome::Delivered { data, .. } => Ok(data),
            NotificationOutcome::Failed { error, .. } => Err(error),
        }
    }

    /// Provider body on success, `{ "error", "kind" }` envelope on failure
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for NotificationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NotificationOutcome::Delivered { data, .. } => data.serialize(serializer),
            NotificationOutcome::Failed { error, .. } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", &error_chain(error))?;
                map.serialize_entry("kind", error.kind())?;
                map.end()
            }
        }
    }
}

/// Error message followed by its sources, `: `-separated
fn error_chain(error: &AppError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Resolves channels to providers and sends through a shared transport
#[derive(Clone)]
pub struct Dispatcher {
    providers: HashMap<String, Arc<dyn NotificationProvider>>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    /// Creates a dispatcher with every built-in provider registered
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let mut dispatcher = Self {
            providers: HashMap::new(),
            transport,
        };
        for provider in builtin_providers() {
            dispatcher.register(provider);
        }
        dispatcher
    }

    /// Creates a dispatcher sending over HTTP with a client built from `config`
    pub fn http(config: &HttpConfig) -> AppResult<Self> {
        let client = build_client(config)?;
        Ok(Self::new(Arc::new(HttpTransport::new(client))))
    }

    /// Registers `provider` under its name and aliases, replacing any
    /// provider already holding one of them.
    pub fn register(&mut self, provider: Arc<dyn NotificationProvider>) {
        let names = std::iter::once(provider.name()).chain(provider.aliases().iter().copied());
        for name in names {
            self.providers
                .insert(name.to_ascii_lowercase(), Arc::clone(&provider));
        }
    }

    /// Sorted primary names of the registered providers
    pub fn channels(&self) -> Vec<&'static str> {
        self.providers
            .values()
            .map(|provider| provider.name())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Aliases registered for the provider called `name`
    pub fn aliases(&self, name: &str) -> &'static [&'static str] {
        self.providers
            .get(name)
            .map(|provider| provider.aliases())
            .unwrap_or(&[])
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Resolves a channel identifier.
    ///
    /// Names match case-insensitively. An unknown identifier that is an
    /// absolute http(s) URL becomes a webhook target; a trailing `:GET` or
    /// `:POST` selects the method (POST by default).
    pub fn resolve(&self, channel: &str) -> AppResult<ChannelTarget> {
        let trimmed = channel.trim();
        if let Some(provider) = self.providers.get(&trimmed.to_ascii_lowercase()) {
            return Ok(ChannelTarget::Named(provider.name()));
        }

        if is_http_url(trimmed) {
            let (url, method) = match trimmed.rsplit_once(':') {
                Some((head, hint)) => match WebhookMethod::from_hint(hint) {
                    Some(method) => (head, method),
                    None => (trimmed, WebhookMethod::default()),
                },
                None => (trimmed, WebhookMethod::default()),
            };
            if Url::parse(url).is_ok_and(|u| u.has_host()) {
                return Ok(ChannelTarget::Webhook {
                    url: url.to_string(),
                    method,
                });
            }
        }

        Err(AppError::UnsupportedChannel {
            channel: channel.to_string(),
        })
    }

    /// Sends `request` on `channel`, propagating any failure.
    pub async fn try_dispatch(
        &self,
        channel: &str,
        request: NotificationRequest,
    ) -> AppResult<Value> {
        match self.resolve(channel)? {
            ChannelTarget::Named(name) => {
                let provider = self
                    .providers
                    .get(name)
                    .ok_or_else(|| AppError::UnsupportedChannel {
                        channel: channel.to_string(),
                    })?;
                provider.send(&request, self.transport.as_ref()).await
            }
            ChannelTarget::Webhook { url, method } => {
                let mut request = request;
                let headers = request
                    .options
                    .webhook
                    .take()
                    .map(|o| o.headers)
                    .unwrap_or_default();
                request.options.webhook = Some(WebhookOptions {
                    url,
                    method,
                    headers,
                });
                WebhookProvider
                    .send(&request, self.transport.as_ref())
                    .await
            }
        }
    }

    /// Sends `request` on `channel` and reports the outcome; never fails.
    pub async fn dispatch(&self, channel: &str, request: NotificationRequest) -> NotificationOutcome {
        let label = self
            .resolve(channel)
            .map(|target| target.label())
            .unwrap_or_else(|_| channel.trim().to_ascii_lowercase());

        match self.try_dispatch(channel, request).await {
            Ok(data) => {
                tracing::info!(channel = %label, "Notification delivered");
                NotificationOutcome::Delivered {
                    channel: label,
                    data,
                }
            }
            Err(error) => {
                tracing::error!(
                    channel = %label,
                    kind = error.kind(),
                    error = %error_chain(&error),
                    "Notification failed"
                );
                NotificationOutcome::Failed {
                    channel: label,
                    error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{ProviderResponse, RecordingTransport};
    use serde_json::json;

    fn dispatcher() -> (Dispatcher, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        (Dispatcher::new(transport.clone()), transport)
    }

    #[test]
    fn test_resolve_names_case_insensitively() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(dispatcher.resolve("Bark").unwrap(), ChannelTarget::Named("bark"));
        assert_eq!(
            dispatcher.resolve("ServerChain").unwrap(),
            ChannelTarget::Named("serverchan")
        );
        assert_eq!(dispatcher.resolve("SCT").unwrap(), ChannelTarget::Named("serverchan"));
    }

    #[test]
    fn test_resolve_url_fallback() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            dispatcher.resolve("https://example.com/hook:GET").unwrap(),
            ChannelTarget::Webhook {
                url: "https://example.com/hook".to_string(),
                method: WebhookMethod::Get,
            }
        );
        assert_eq!(
            dispatcher.resolve("http://127.0.0.1:8080/notify").unwrap(),
            ChannelTarget::Webhook {
                url: "http://127.0.0.1:8080/notify".to_string(),
                method: WebhookMethod::Post,
            }
        );
    }

    #[test]
    fn test_resolve_unknown() {
        let (dispatcher, _) = dispatcher();
        for channel in ["unknownchannel", "ftp://example.com/x", "https://"] {
            let err = dispatcher.resolve(channel).unwrap_err();
            assert_eq!(err.kind(), "unsupported_channel", "{channel}");
        }
    }

    #[test]
    fn test_channels_lists_primary_names() {
        let (dispatcher, _) = dispatcher();
        let channels = dispatcher.channels();
        assert_eq!(channels.len(), builtin_providers().len());
        assert!(channels.windows(2).all(|w| w[0] < w[1]));
        assert!(channels.contains(&"wecomapp"));
        assert!(!channels.contains(&"sct"));
        assert_eq!(dispatcher.aliases("serverchan"), &["serverchain", "sct"]);
    }

    #[tokio::test]
    async fn test_bark_scenario() {
        let transport = Arc::new(
            RecordingTransport::new()
                .reply(ProviderResponse::json(200, &json!({"code": 200, "message": "success"}))),
        );
        let dispatcher = Dispatcher::new(transport.clone());

        let outcome = dispatcher
            .dispatch("bark", NotificationRequest::new("abc123", "# Hello\nWorld"))
            .await;

        assert!(outcome.is_delivered());
        assert_eq!(outcome.to_json(), json!({"code": 200, "message": "success"}));
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, reqwest::Method::GET);
        assert_eq!(request.url.as_str(), "https://api.day.app/abc123/Hello/World/");
    }

    #[tokio::test]
    async fn test_unknown_channel_issues_no_call() {
        let (dispatcher, transport) = dispatcher();
        let outcome = dispatcher
            .dispatch("unknownchannel", NotificationRequest::new("t", "x"))
            .await;

        assert!(!outcome.is_delivered());
        assert_eq!(
            outcome.to_json(),
            json!({"error": "Unsupported channel: unknownchannel", "kind": "unsupported_channel"})
        );
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_webhook_get_fallback() {
        let (dispatcher, transport) = dispatcher();
        let outcome = dispatcher
            .dispatch("https://example.com/hook:GET", NotificationRequest::new("", "hi"))
            .await;

        assert!(outcome.is_delivered());
        assert_eq!(outcome.channel(), "webhook:example.com");
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, reqwest::Method::GET);
        assert_eq!(request.url.as_str(), "https://example.com/hook?content=hi");
    }

    #[tokio::test]
    async fn test_every_provider_rejects_empty_content_before_sending() {
        let (dispatcher, transport) = dispatcher();
        for channel in dispatcher.channels() {
            let outcome = dispatcher
                .dispatch(channel, NotificationRequest::new("a#b#1#d", ""))
                .await;
            let error = outcome.error().unwrap();
            assert_eq!(error.kind(), "missing_field", "{channel}");
            assert_eq!(error.to_string(), "content is required", "{channel}");
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_code() {
        let transport = Arc::new(
            RecordingTransport::new()
                .reply(ProviderResponse::json(200, &json!({"errcode": 300001, "errmsg": "token invalid"}))),
        );
        let dispatcher = Dispatcher::new(transport.clone());

        let outcome = dispatcher
            .dispatch("dingtalk", NotificationRequest::new("tok", "hello"))
            .await;
        let envelope = outcome.to_json();
        assert_eq!(envelope["kind"], "provider_call");
        assert!(envelope["error"].as_str().unwrap().contains("token invalid"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let transport = Arc::new(
            RecordingTransport::new().reply(ProviderResponse::new(502, "Bad Gateway")),
        );
        let dispatcher = Dispatcher::new(transport.clone());

        let err = dispatcher
            .try_dispatch("pushdeer", NotificationRequest::new("PDU1", "hello"))
            .await
            .unwrap_err();
        match err {
            AppError::ProviderCall { status, .. } => assert_eq!(status, Some(502)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_custom_provider() {
        struct Echo;
        impl NotificationProvider for Echo {
            fn name(&self) -> &'static str {
                "echo"
            }
            fn aliases(&self) -> &'static [&'static str] {
                &["Repeat"]
            }
            fn build_request(
                &self,
                request: &NotificationRequest,
            ) -> AppResult<crate::external::ProviderRequest> {
                let url = Url::parse("https://echo.test/").map_err(anyhow::Error::from)?;
                Ok(crate::external::ProviderRequest::post(url).text(request.content.clone()))
            }
        }

        let (mut dispatcher, transport) = dispatcher();
        dispatcher.register(Arc::new(Echo));
        assert_eq!(dispatcher.resolve("repeat").unwrap(), ChannelTarget::Named("echo"));

        let outcome = dispatcher
            .dispatch("echo", NotificationRequest::new("", "ping"))
            .await;
        assert!(outcome.is_delivered());
        assert_eq!(transport.providers(), vec!["echo".to_string()]);
    }
}
