//! pushrelay library
//!
//! Sends one markdown message to one of many push, chat-bot and webhook
//! providers. The [`services::Dispatcher`] resolves a channel name to a
//! provider adapter and reports a [`services::NotificationOutcome`].

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod services;
pub mod text;

pub use error::{AppError, AppResult};
pub use services::{Dispatcher, NotificationOutcome, NotificationRequest};

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
