//! In-memory transport that records requests instead of sending them.
//!
//! Backs `pushrelay send --dry-run` and the adapter tests: every request is
//! stored, and responses come from a queue of canned replies (falling back to
//! a `200 {}` reply once the queue is empty).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::transport::{ProviderRequest, ProviderResponse, Transport};
use crate::error::AppResult;

#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<(String, ProviderRequest)>>,
    replies: Mutex<VecDeque<ProviderResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` to answer the next unanswered request.
    pub fn reply(self, response: ProviderResponse) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
        self
    }

    /// All requests seen so far, in order
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Provider names of all requests seen so far, in order
    pub fn providers(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(provider, _)| provider.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .map(|(_, request)| request.clone())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(
        &self,
        provider: &str,
        request: ProviderRequest,
    ) -> AppResult<ProviderResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((provider.to_string(), request));
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        Ok(reply.unwrap_or_else(|| ProviderResponse::new(200, "{}")))
    }
}
