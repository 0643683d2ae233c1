use thiserror::Error;

/// Library-wide error type for everything that can go wrong during a dispatch.
///
/// Validation failures are raised before any network call; provider failures
/// cover both transport errors and provider-reported failure codes.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required request field or token segment is absent or empty
    #[error("{field} is required")]
    MissingField { field: String },

    /// Channel name is not registered and is not an absolute URL
    #[error("Unsupported channel: {channel}")]
    UnsupportedChannel { channel: String },

    /// Provider answered with a non-2xx status or a failure code in its body
    #[error("Provider {provider} rejected the message: {reason}")]
    ProviderCall {
        provider: String,
        status: Option<u16>,
        reason: String,
    },

    /// Outbound HTTP call failed before a response was received
    #[error("Request to {provider} failed")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        AppError::MissingField {
            field: field.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn provider_call(
        provider: impl Into<String>,
        status: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        AppError::ProviderCall {
            provider: provider.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Stable snake_case tag used in serialized error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingField { .. } => "missing_field",
            AppError::UnsupportedChannel { .. } => "unsupported_channel",
            AppError::ProviderCall { .. } | AppError::Transport { .. } => "provider_call",
            AppError::Validation { .. } => "validation",
            AppError::Configuration { .. } => "configuration",
            AppError::Internal { .. } => "internal",
        }
    }

    /// Whether the failure happened before any request left the process.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingField { .. }
                | AppError::UnsupportedChannel { .. }
                | AppError::Validation { .. }
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        AppError::Configuration {
            key: error.key().to_string(),
            source: anyhow::Error::new(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
