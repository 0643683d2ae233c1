//! Notification system with pluggable providers.
//!
//! The core trait `NotificationProvider` turns a message into one provider
//! request; the `Dispatcher` maps channel names to providers and reports a
//! `NotificationOutcome`. New channels are added by registering another
//! provider, never by branching inside the dispatcher.

mod bark_provider;
mod dingtalk_provider;
mod discord_provider;
mod feishu_provider;
mod ifttt_provider;
mod igot_provider;
mod join_provider;
mod ntfy_provider;
mod pushdeer_provider;
mod pushover_provider;
mod pushplus_provider;
mod qq_provider;
mod serverchan_provider;
mod telegram_provider;
mod webhook_provider;
mod wecom_provider;
mod wxpusher_provider;

pub mod dispatcher;
pub mod options;
pub mod provider;
pub mod validator;

pub use bark_provider::BarkProvider;
pub use dingtalk_provider::DingTalkProvider;
pub use discord_provider::DiscordProvider;
pub use dispatcher::{ChannelTarget, Dispatcher, NotificationOutcome, builtin_providers};
pub use feishu_provider::FeishuProvider;
pub use ifttt_provider::IftttProvider;
pub use igot_provider::IGotProvider;
pub use join_provider::JoinProvider;
pub use ntfy_provider::NtfyProvider;
pub use options::{ProviderOptions, WebhookMethod};
pub use provider::{NotificationProvider, NotificationRequest, RenderedMessage};
pub use pushdeer_provider::PushDeerProvider;
pub use pushover_provider::PushoverProvider;
pub use pushplus_provider::{PushPlusHxtripProvider, PushPlusProvider};
pub use qq_provider::{AtriProvider, GoCqHttpProvider, QmsgProvider};
pub use serverchan_provider::ServerChanProvider;
pub use telegram_provider::TelegramProvider;
pub use webhook_provider::WebhookProvider;
pub use wecom_provider::{WeComAppProvider, WeComBotProvider};
pub use wxpusher_provider::WxPusherProvider;
