//! Per-provider option shapes.
//!
//! A request carries a single [`ProviderOptions`] bag; each provider reads
//! only its own entry and falls back to defaults when it is absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Options for every provider, keyed by channel name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    pub webhook: Option<WebhookOptions>,
    pub bark: Option<BarkOptions>,
    pub dingtalk: Option<DingTalkOptions>,
    pub wecombot: Option<WeComBotOptions>,
    pub wecomapp: Option<WeComAppOptions>,
    pub telegram: Option<TelegramOptions>,
    pub pushplus: Option<PushPlusOptions>,
    pub pushdeer: Option<PushDeerOptions>,
    pub wxpusher: Option<WxPusherOptions>,
    pub qmsg: Option<QmsgOptions>,
    pub gocqhttp: Option<GoCqHttpOptions>,
    pub ifttt: Option<IftttOptions>,
    pub discord: Option<DiscordOptions>,
    pub ntfy: Option<NtfyOptions>,
    pub pushover: Option<PushoverOptions>,
}

/// HTTP method used by the generic webhook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookMethod {
    #[serde(rename = "GET", alias = "get")]
    Get,
    #[default]
    #[serde(rename = "POST", alias = "post")]
    Post,
}

impl WebhookMethod {
    /// Parses a method hint such as `GET` or `post`
    pub fn from_hint(hint: &str) -> Option<Self> {
        if hint.eq_ignore_ascii_case("get") {
            Some(WebhookMethod::Get)
        } else if hint.eq_ignore_ascii_case("post") {
            Some(WebhookMethod::Post)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookOptions {
    pub url: String,
    pub method: WebhookMethod,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarkOptions {
    pub sound: Option<String>,
    pub group: Option<String>,
    pub icon: Option<String>,
    /// One of `active`, `timeSensitive`, `passive`, `critical`
    pub level: Option<String>,
    /// Link opened when the notification is tapped
    pub url: Option<String>,
}

/// Message layout for chat-bot style providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotMessageType {
    #[default]
    Markdown,
    Text,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DingTalkOptions {
    pub msgtype: BotMessageType,
    pub at_mobiles: Vec<String>,
    pub at_all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeComBotOptions {
    pub msgtype: BotMessageType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeComAppOptions {
    /// Recipients, `|`-separated; the token's fourth segment wins if present
    pub touser: Option<String>,
    pub msgtype: BotMessageType,
}

impl Default for WeComAppOptions {
    fn default() -> Self {
        Self {
            touser: None,
            msgtype: BotMessageType::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramOptions {
    /// Alternative Bot API base, e.g. a self-hosted relay
    pub api_base: Option<String>,
    pub disable_notification: bool,
    pub disable_web_page_preview: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushPlusOptions {
    pub template: Option<String>,
    pub topic: Option<String>,
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushDeerOptions {
    /// Self-hosted server base URL
    pub server: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WxPusherOptions {
    pub topic_ids: Vec<u64>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QmsgOptions {
    /// Target QQ number(s), comma-separated
    pub qq: Option<String>,
    /// Send to a group instead of a private chat
    pub group: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoCqHttpOptions {
    /// `private` or `group`
    pub message_type: Option<String>,
    pub user_id: Option<i64>,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IftttOptions {
    pub value3: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordOptions {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NtfyOptions {
    /// Server base used when the token is a bare topic
    pub server: Option<String>,
    /// 1 (min) to 5 (max)
    pub priority: Option<u8>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushoverOptions {
    /// -2 (lowest) to 1 (high); emergency (2) needs retry parameters and is rejected
    pub priority: Option<i8>,
    pub sound: Option<String>,
    pub device: Option<String>,
    pub url: Option<String>,
}
