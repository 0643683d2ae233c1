//! Service layer.
//!
//! Holds the notification system: provider adapters and the dispatcher that
//! routes a message to one of them.

pub mod notifications;

pub use notifications::{Dispatcher, NotificationOutcome, NotificationRequest};
