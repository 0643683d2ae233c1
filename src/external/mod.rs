//! Outbound HTTP plumbing shared by all provider adapters.

pub mod client;
pub mod recording;
pub mod transport;

pub use client::{HTTP_CLIENT, build_client};
pub use recording::RecordingTransport;
pub use transport::{HttpTransport, ProviderRequest, ProviderResponse, RequestBody, Transport};
