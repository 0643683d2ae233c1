use std::sync::LazyLock;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{AppError, AppResult};

/// Global HTTP client built from the default [`HttpConfig`].
///
/// Initialized lazily on first access and shared by every dispatcher that
/// does not bring its own client, so connections to the same provider are
/// pooled across calls.
///
/// # Features
/// - **Timeouts**: 30s request timeout, 10s connect timeout
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    build_client(&HttpConfig::default()).expect("Failed to build default HTTP client")
});

/// Builds a reqwest client from HTTP settings.
///
/// # Errors
/// Returns `AppError::Validation` for an unparsable proxy URL and
/// `AppError::Configuration` when the TLS backend cannot be initialized.
pub fn build_client(config: &HttpConfig) -> AppResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        // Connection pooling
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(config.user_agent.clone());

    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| AppError::validation("http.proxy", e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| AppError::Configuration {
        key: "http".to_string(),
        source: anyhow::Error::new(e),
    })
}
